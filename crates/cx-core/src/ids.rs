use rand::Rng;
use uuid::Uuid;

/// Draw a v4 UUID from `rng`, so ids replay with the seed.
pub fn random_uuid(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

/// First eight hex digits, for display and prefix lookup.
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Whether `query` names `id`, either in full or as a prefix of its hex form.
pub fn id_matches(id: &Uuid, query: &str) -> bool {
    let query = query.trim().to_ascii_lowercase().replace('-', "");
    !query.is_empty() && id.simple().to_string().starts_with(&query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seeded_ids_repeat() {
        let a = random_uuid(&mut StdRng::seed_from_u64(7));
        let b = random_uuid(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn prefix_lookup() {
        let id = random_uuid(&mut StdRng::seed_from_u64(1));
        let short = short_id(&id);
        assert_eq!(short.len(), 8);
        assert!(id_matches(&id, &short));
        assert!(id_matches(&id, &id.to_string()));
        assert!(!id_matches(&id, ""));
    }
}
