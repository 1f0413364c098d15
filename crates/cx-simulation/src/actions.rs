//! Player commands: parsing from a command line and applying them to the state.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use cx_core::artifact::artifact_def;
use cx_core::drill::{DrillSlot, upgrade_cost};
use cx_core::faction::Perk;
use cx_core::license::PermitKind;
use cx_core::region::{RegionId, ZoneColor, travel_time_ms};
use cx_core::resource::{ResourceKind, Resources};
use cx_core::skill::{skill_cost, skill_def};
use cx_economy::base::{BaseType, Facility};
use cx_economy::caravan::{CaravanTier, send, unlock_tier};
use cx_economy::city::{buff_offer, buy_buff, gamble, repair, trade, trade_offer};
use cx_economy::expedition::{
    cancel as cancel_expedition, collect as collect_expedition, launch as launch_expedition,
};
use cx_economy::recipe::{craft, recipe};
use cx_economy::{
    BlackMarketReward, EconError, ExpeditionDifficulty, ExpeditionStatus, ProgressSnapshot, Trader,
};
use cx_mechanics::{AbilityKind, EventAction};
use tracing::{info, warn};

use crate::context::SimContext;
use crate::drone::DroneKind;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::state::{Analysis, QUEST_GLOBAL_REPUTATION, Travel};
use crate::systems::events::resolve_event;

/// Highest part tier the city workshop builds. Higher tiers need a base workshop.
pub const CITY_WORKSHOP_MAX_TIER: u32 = 3;

/// A player command.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    /// Start the drill.
    StartDrilling,
    /// Stop the drill.
    StopDrilling,
    /// Begin venting heat by hand.
    StartCooling,
    /// Stop venting.
    StopCooling,
    /// One manual vent while cooling.
    Vent,
    /// Leave for another region.
    Travel {
        /// Destination.
        to: RegionId,
    },
    /// Build a base in the current region.
    BuildBase {
        /// Size class.
        base_type: BaseType,
    },
    /// Add a facility to the base in the current region.
    BuildFacility {
        /// Facility to build.
        facility: Facility,
    },
    /// Move resources into the local base.
    Deposit {
        /// Resource.
        resource: ResourceKind,
        /// Amount.
        amount: f64,
    },
    /// Take resources out of the local base.
    Withdraw {
        /// Resource.
        resource: ResourceKind,
        /// Amount.
        amount: f64,
    },
    /// Dispatch a caravan between two bases.
    SendCaravan {
        /// Source base, by region or id prefix.
        from: String,
        /// Destination base, by region or id prefix.
        to: String,
        /// Caravan class.
        tier: CaravanTier,
        /// Goods to ship.
        cargo: Vec<(ResourceKind, f64)>,
    },
    /// Buy access to a caravan tier.
    UnlockCaravanTier {
        /// Tier to unlock.
        tier: CaravanTier,
    },
    /// Buy from the local station market.
    Buy {
        /// Resource.
        resource: ResourceKind,
        /// Amount.
        amount: f64,
    },
    /// Sell to the local station market.
    Sell {
        /// Resource.
        resource: ResourceKind,
        /// Amount.
        amount: f64,
    },
    /// Buy a black market item.
    BlackMarket {
        /// Item id.
        item: String,
    },
    /// Buy a zone license.
    BuyLicense {
        /// Zone.
        zone: ZoneColor,
    },
    /// Buy a region permit.
    BuyPermit {
        /// Region.
        region: RegionId,
        /// Temporary or permanent.
        kind: PermitKind,
    },
    /// Answer the pending choice event.
    Choose {
        /// Chosen option.
        action: EventAction,
    },
    /// Acknowledge the pending event.
    Dismiss,
    /// Take on a quest.
    AcceptQuest {
        /// Quest id.
        id: String,
    },
    /// Hand in a finished quest.
    CompleteQuest {
        /// Quest id.
        id: String,
    },
    /// Pay for a new batch of contracts.
    RefreshQuests,
    /// Run a refinery or workshop recipe.
    Craft {
        /// Recipe id.
        recipe: String,
        /// Number of runs.
        times: u32,
    },
    /// Take a city barter offer.
    Trade {
        /// Offer id.
        offer: String,
    },
    /// Repair the hull in the city.
    Repair,
    /// Cool the drill down in the city medbay.
    Heal,
    /// Bet resources at the casino.
    Gamble {
        /// Stake currency.
        resource: ResourceKind,
        /// Stake.
        amount: f64,
    },
    /// Buy a city buff or drink.
    Buff {
        /// Effect id.
        effect: String,
    },
    /// Queue an ability.
    Ability {
        /// Ability.
        kind: AbilityKind,
    },
    /// Put an artifact in the analyzer.
    Analyze {
        /// Artifact id prefix.
        artifact: String,
    },
    /// Equip an identified artifact.
    Equip {
        /// Artifact id prefix.
        artifact: String,
    },
    /// Unequip an artifact.
    Unequip {
        /// Artifact id prefix.
        artifact: String,
    },
    /// Sell an artifact in the city.
    SellArtifact {
        /// Artifact id prefix.
        artifact: String,
    },
    /// Build the next tier part for a slot.
    UpgradePart {
        /// Slot.
        slot: DrillSlot,
    },
    /// Learn the next level of a skill.
    UpgradeSkill {
        /// Skill id.
        id: String,
    },
    /// Report the boss phase minigame.
    Minigame {
        /// Whether the player won it.
        success: bool,
    },
    /// Buy or upgrade a drone.
    Drone {
        /// Drone kind.
        kind: DroneKind,
    },
    /// Send a drone swarm after a resource.
    LaunchExpedition {
        /// Risk and reward band.
        difficulty: ExpeditionDifficulty,
        /// Swarm size.
        drones: u32,
        /// Resource sought.
        target: ResourceKind,
    },
    /// Bank a returned expedition.
    CollectExpedition {
        /// Expedition id prefix.
        id: String,
    },
    /// Recall an expedition still out.
    CancelExpedition {
        /// Expedition id prefix.
        id: String,
    },
}

fn parse_error(input: &str, reason: impl Into<String>) -> SimError {
    SimError::Parse {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn word<'a>(words: &[&'a str], index: usize, input: &str, what: &str) -> SimResult<&'a str> {
    words
        .get(index)
        .copied()
        .ok_or_else(|| parse_error(input, format!("missing {what}")))
}

fn value<T>(s: &str, input: &str) -> SimResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    s.parse::<T>().map_err(|e| parse_error(input, e.to_string()))
}

fn amount(s: &str, input: &str) -> SimResult<f64> {
    let n: f64 = s
        .parse()
        .map_err(|_| parse_error(input, format!("\"{s}\" is not a number")))?;
    if !n.is_finite() || n <= 0.0 {
        return Err(parse_error(input, format!("amount must be positive, got {s}")));
    }
    Ok(n)
}

/// Parse `iron:100,copper:50` into a cargo list.
fn cargo(s: &str, input: &str) -> SimResult<Vec<(ResourceKind, f64)>> {
    s.split(',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (kind, qty) = part
                .split_once(':')
                .ok_or_else(|| parse_error(input, format!("cargo entry \"{part}\" needs resource:amount")))?;
            Ok((value(kind, input)?, amount(qty, input)?))
        })
        .collect()
}

fn permit_kind(s: &str, input: &str) -> SimResult<PermitKind> {
    match s.to_ascii_lowercase().as_str() {
        "temp" | "temporary" => Ok(PermitKind::Temporary),
        "perm" | "permanent" => Ok(PermitKind::Permanent),
        _ => Err(parse_error(input, format!("unknown permit kind \"{s}\""))),
    }
}

impl PlayerAction {
    /// Parse a command line such as `travel iron_gates` or `buy iron 50`.
    pub fn parse(line: &str) -> SimResult<Self> {
        let input = line.trim();
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some(verb) = words.first() else {
            return Err(parse_error(input, "empty command"));
        };
        let arg = |i: usize, what: &str| word(&words, i, input, what);

        let action = match verb.to_ascii_lowercase().as_str() {
            "drill" => match arg(1, "start or stop")? {
                "start" | "on" => Self::StartDrilling,
                "stop" | "off" => Self::StopDrilling,
                other => return Err(parse_error(input, format!("unknown drill mode \"{other}\""))),
            },
            "cool" => match arg(1, "start or stop")? {
                "start" | "on" => Self::StartCooling,
                "stop" | "off" => Self::StopCooling,
                other => return Err(parse_error(input, format!("unknown cooling mode \"{other}\""))),
            },
            "vent" => Self::Vent,
            "travel" | "go" => Self::Travel {
                to: value(arg(1, "region")?, input)?,
            },
            "build" => match arg(1, "base or facility")? {
                "base" => Self::BuildBase {
                    base_type: value(arg(2, "base type")?, input)?,
                },
                "facility" => Self::BuildFacility {
                    facility: value(arg(2, "facility")?, input)?,
                },
                other => return Err(parse_error(input, format!("cannot build \"{other}\""))),
            },
            "deposit" => Self::Deposit {
                resource: value(arg(1, "resource")?, input)?,
                amount: amount(arg(2, "amount")?, input)?,
            },
            "withdraw" => Self::Withdraw {
                resource: value(arg(1, "resource")?, input)?,
                amount: amount(arg(2, "amount")?, input)?,
            },
            "caravan" => match arg(1, "send or unlock")? {
                "send" => Self::SendCaravan {
                    from: arg(2, "source base")?.to_string(),
                    to: arg(3, "destination base")?.to_string(),
                    tier: value(arg(4, "tier")?, input)?,
                    cargo: cargo(arg(5, "cargo")?, input)?,
                },
                "unlock" => Self::UnlockCaravanTier {
                    tier: value(arg(2, "tier")?, input)?,
                },
                other => return Err(parse_error(input, format!("unknown caravan command \"{other}\""))),
            },
            "buy" => Self::Buy {
                resource: value(arg(1, "resource")?, input)?,
                amount: amount(arg(2, "amount")?, input)?,
            },
            "sell" if words.get(1) == Some(&"artifact") => Self::SellArtifact {
                artifact: arg(2, "artifact")?.to_string(),
            },
            "sell" => Self::Sell {
                resource: value(arg(1, "resource")?, input)?,
                amount: amount(arg(2, "amount")?, input)?,
            },
            "blackmarket" | "bm" => Self::BlackMarket {
                item: arg(1, "item")?.to_string(),
            },
            "license" => Self::BuyLicense {
                zone: value(arg(1, "zone")?, input)?,
            },
            "permit" => Self::BuyPermit {
                region: value(arg(1, "region")?, input)?,
                kind: match words.get(2) {
                    Some(kind) => permit_kind(kind, input)?,
                    None => PermitKind::Temporary,
                },
            },
            "choose" => Self::Choose {
                action: value(arg(1, "option")?, input)?,
            },
            "dismiss" | "ok" => Self::Dismiss,
            "quest" => match arg(1, "accept, complete or refresh")? {
                "accept" => Self::AcceptQuest {
                    id: arg(2, "quest id")?.to_string(),
                },
                "complete" => Self::CompleteQuest {
                    id: arg(2, "quest id")?.to_string(),
                },
                "refresh" => Self::RefreshQuests,
                other => return Err(parse_error(input, format!("unknown quest command \"{other}\""))),
            },
            "craft" | "refine" => Self::Craft {
                recipe: arg(1, "recipe")?.to_string(),
                times: match words.get(2) {
                    Some(n) => n
                        .parse()
                        .map_err(|_| parse_error(input, format!("\"{n}\" is not a count")))?,
                    None => 1,
                },
            },
            "trade" => Self::Trade {
                offer: arg(1, "offer")?.to_string(),
            },
            "repair" => Self::Repair,
            "heal" => Self::Heal,
            "gamble" => Self::Gamble {
                resource: value(arg(1, "resource")?, input)?,
                amount: amount(arg(2, "amount")?, input)?,
            },
            "buff" => Self::Buff {
                effect: arg(1, "effect")?.to_string(),
            },
            "ability" | "use" => Self::Ability {
                kind: value(arg(1, "ability")?, input)?,
            },
            "analyze" => Self::Analyze {
                artifact: arg(1, "artifact")?.to_string(),
            },
            "equip" => Self::Equip {
                artifact: arg(1, "artifact")?.to_string(),
            },
            "unequip" => Self::Unequip {
                artifact: arg(1, "artifact")?.to_string(),
            },
            "upgrade" => match arg(1, "part or skill")? {
                "part" => Self::UpgradePart {
                    slot: value(arg(2, "slot")?, input)?,
                },
                "skill" => Self::UpgradeSkill {
                    id: arg(2, "skill")?.to_string(),
                },
                other => return Err(parse_error(input, format!("cannot upgrade \"{other}\""))),
            },
            "minigame" => match arg(1, "win or lose")? {
                "win" | "success" => Self::Minigame { success: true },
                "lose" | "fail" => Self::Minigame { success: false },
                other => return Err(parse_error(input, format!("unknown result \"{other}\""))),
            },
            "drone" => Self::Drone {
                kind: value(arg(1, "drone")?, input)?,
            },
            "expedition" | "exp" => match arg(1, "launch, collect or cancel")? {
                "launch" => Self::LaunchExpedition {
                    difficulty: value(arg(2, "difficulty")?, input)?,
                    drones: value(arg(3, "drone count")?, input)?,
                    target: value(arg(4, "resource")?, input)?,
                },
                "collect" => Self::CollectExpedition {
                    id: arg(2, "expedition id")?.to_string(),
                },
                "cancel" | "recall" => Self::CancelExpedition {
                    id: arg(2, "expedition id")?.to_string(),
                },
                other => return Err(parse_error(input, format!("unknown expedition command \"{other}\""))),
            },
            other => return Err(parse_error(input, format!("unknown command \"{other}\""))),
        };
        Ok(action)
    }

    /// Short label used in logs and the event log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StartDrilling | Self::StopDrilling => "drill",
            Self::StartCooling | Self::StopCooling | Self::Vent => "cooling",
            Self::Travel { .. } => "travel",
            Self::BuildBase { .. } => "build_base",
            Self::BuildFacility { .. } => "build_facility",
            Self::Deposit { .. } | Self::Withdraw { .. } => "transfer",
            Self::SendCaravan { .. } => "caravan",
            Self::UnlockCaravanTier { .. } => "caravan_unlock",
            Self::Buy { .. } | Self::Sell { .. } => "market",
            Self::BlackMarket { .. } => "black_market",
            Self::BuyLicense { .. } => "license",
            Self::BuyPermit { .. } => "permit",
            Self::Choose { .. } | Self::Dismiss => "event",
            Self::AcceptQuest { .. } | Self::CompleteQuest { .. } | Self::RefreshQuests => "quest",
            Self::Craft { .. } => "craft",
            Self::Trade { .. } => "trade",
            Self::Repair => "repair",
            Self::Heal => "heal",
            Self::Gamble { .. } => "gamble",
            Self::Buff { .. } => "buff",
            Self::Ability { .. } => "ability",
            Self::Analyze { .. } => "analyze",
            Self::Equip { .. } | Self::Unequip { .. } => "equip",
            Self::SellArtifact { .. } => "sell_artifact",
            Self::UpgradePart { .. } => "upgrade_part",
            Self::UpgradeSkill { .. } => "upgrade_skill",
            Self::Minigame { .. } => "minigame",
            Self::Drone { .. } => "drone",
            Self::LaunchExpedition { .. }
            | Self::CollectExpedition { .. }
            | Self::CancelExpedition { .. } => "expedition",
        }
    }
}

impl FromStr for PlayerAction {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        Self::parse(s)
    }
}

/// Validate and apply `action`. Returns a message for the player.
///
/// Rejected actions leave the state untouched.
pub fn apply_action(ctx: &mut SimContext<'_>, action: &PlayerAction) -> SimResult<String> {
    match perform(ctx, action) {
        Ok(message) => {
            ctx.state.enforce_bounds();
            info!(action = action.label(), "{message}");
            ctx.emit(
                SimEventKind::Action {
                    label: action.label().to_string(),
                },
                message.clone(),
            );
            Ok(message)
        }
        Err(e) => {
            warn!(action = action.label(), error = %e, "action rejected");
            Err(e)
        }
    }
}

fn not_allowed(reason: impl Into<String>) -> SimError {
    SimError::NotAllowed(reason.into())
}

fn require_not_traveling(ctx: &SimContext<'_>) -> SimResult<()> {
    if ctx.state.is_traveling() {
        return Err(not_allowed("not while travelling"));
    }
    Ok(())
}

/// City services need the drill parked.
fn require_city(ctx: &SimContext<'_>) -> SimResult<()> {
    require_not_traveling(ctx)?;
    if ctx.state.drilling {
        return Err(not_allowed("stop drilling to visit the city"));
    }
    Ok(())
}

fn perform(ctx: &mut SimContext<'_>, action: &PlayerAction) -> SimResult<String> {
    let now = ctx.now_ms();
    match action {
        PlayerAction::StartDrilling => {
            let state = &mut *ctx.state;
            if state.is_traveling() {
                return Err(not_allowed("cannot drill while travelling"));
            }
            if state.stuck {
                return Err(not_allowed(format!("no permit to drill in {}", state.region)));
            }
            if state.vitals.is_broken() {
                return Err(not_allowed("hull is broken, repair first"));
            }
            state.drilling = true;
            Ok("drill started".into())
        }
        PlayerAction::StopDrilling => {
            ctx.state.drilling = false;
            Ok("drill stopped".into())
        }
        PlayerAction::StartCooling => {
            let vitals = &mut ctx.state.vitals;
            if vitals.cooling_game {
                return Err(not_allowed("already venting"));
            }
            vitals.cooling_game = true;
            Ok("manual venting started".into())
        }
        PlayerAction::StopCooling => {
            ctx.state.vitals.cooling_game = false;
            Ok("manual venting stopped".into())
        }
        PlayerAction::Vent => {
            if !ctx.state.vitals.cooling_game {
                return Err(not_allowed("start venting first"));
            }
            let amount = ctx.state.stats().vent_speed.max(1.0);
            let vitals = &mut ctx.state.vitals;
            vitals.heat = (vitals.heat - amount).max(0.0);
            Ok(format!("vented {amount:.1} heat"))
        }
        PlayerAction::Travel { to } => travel(ctx, *to),
        PlayerAction::BuildBase { base_type } => {
            require_not_traveling(ctx)?;
            let state = &mut *ctx.state;
            let region = state.region;
            let id = state
                .bases
                .build(ctx.rng, region, *base_type, &mut state.resources, now)?;
            match state.bases.get(id) {
                Some(base) if !base.is_active() => {
                    let minutes = (base.completion_ms - now).div_ceil(60_000);
                    Ok(format!("{base_type} in {region} ready in {minutes} min"))
                }
                _ => Ok(format!("{base_type} in {region} is operational")),
            }
        }
        PlayerAction::BuildFacility { facility } => {
            let state = &mut *ctx.state;
            let id = state
                .current_base()
                .map(|b| b.id)
                .ok_or(EconError::NoBaseInRegion(state.region))?;
            state.bases.build_facility(id, *facility, &mut state.resources)?;
            Ok(format!("{facility} built in {}", state.region))
        }
        PlayerAction::Deposit { resource, amount } => {
            require_not_traveling(ctx)?;
            let state = &mut *ctx.state;
            state
                .bases
                .transfer_to_base(state.region, *resource, *amount, &mut state.resources)?;
            Ok(format!("stored {amount} {resource}"))
        }
        PlayerAction::Withdraw { resource, amount } => {
            require_not_traveling(ctx)?;
            let state = &mut *ctx.state;
            state
                .bases
                .transfer_from_base(state.region, *resource, *amount, &mut state.resources)?;
            Ok(format!("took {amount} {resource}"))
        }
        PlayerAction::SendCaravan {
            from,
            to,
            tier,
            cargo,
        } => {
            let state = &mut *ctx.state;
            let from_id = state.bases.find(from)?.id;
            let to_id = state.bases.find(to)?.id;
            let perks = state.logistics_perks();
            let caravan = send(
                ctx.rng,
                &mut state.bases,
                from_id,
                to_id,
                Resources::from_bundle(cargo),
                *tier,
                &state.caravan_tiers,
                perks,
                now,
            )?;
            let message = format!(
                "{tier} caravan {} -> {} arrives in {} min",
                caravan.from_region,
                caravan.to_region,
                caravan.eta(now).remaining_minutes
            );
            state.caravans.push(caravan);
            Ok(message)
        }
        PlayerAction::UnlockCaravanTier { tier } => {
            let state = &mut *ctx.state;
            unlock_tier(*tier, &mut state.caravan_tiers, &mut state.resources)?;
            Ok(format!("{tier} caravans unlocked"))
        }
        PlayerAction::Buy { resource, amount } | PlayerAction::Sell { resource, amount } => {
            require_not_traveling(ctx)?;
            let state = &mut *ctx.state;
            let mods = state.price_modifiers();
            let mut trader = Trader {
                wallet: &mut state.resources,
                bases: &state.bases,
                region: state.region,
                history: &mut state.market_history,
                now_ms: now,
            };
            let (verb, tx) = if matches!(action, PlayerAction::Buy { .. }) {
                ("bought", trader.buy(*resource, *amount, mods)?)
            } else {
                ("sold", trader.sell(*resource, *amount, mods)?)
            };
            Ok(format!("{verb} {amount} {resource} for {:.0} rubies", tx.total))
        }
        PlayerAction::BlackMarket { item } => {
            let state = &mut *ctx.state;
            let unlocked = state.black_market_unlocked();
            let reward = state
                .black_market
                .purchase(item, &state.reputation, unlocked, &mut state.resources)?;
            let message = match reward {
                BlackMarketReward::Resource(kind, amount) => format!("received {amount} {kind}"),
                BlackMarketReward::Blueprint(id) => {
                    state.blueprints.insert(id.to_string());
                    format!("blueprint {id} acquired")
                }
                BlackMarketReward::Shield(charge) => {
                    state.shield_charge = (state.shield_charge + charge).min(100.0);
                    format!("shield +{charge}")
                }
                BlackMarketReward::HeatVent => {
                    state.vitals.heat = 0.0;
                    "heat vented".to_string()
                }
            };
            Ok(message)
        }
        PlayerAction::BuyLicense { zone } => {
            let state = &mut *ctx.state;
            let price = state.licenses.buy_license(*zone, &mut state.resources)?;
            Ok(format!("{zone} license bought for {price} rubies"))
        }
        PlayerAction::BuyPermit { region, kind } => {
            let state = &mut *ctx.state;
            let price = state
                .licenses
                .buy_permit(*region, *kind, &mut state.resources, now)?;
            let kind = match kind {
                PermitKind::Temporary => "temporary",
                PermitKind::Permanent => "permanent",
            };
            Ok(format!("{kind} permit for {region} bought for {price} rubies"))
        }
        PlayerAction::Choose { action } => resolve_event(ctx, Some(*action)),
        PlayerAction::Dismiss => resolve_event(ctx, None),
        PlayerAction::AcceptQuest { id } => {
            let state = &mut *ctx.state;
            let snap = ProgressSnapshot {
                wallet: &state.resources,
                bases: &state.bases,
                depth: state.depth,
                artifacts_found: state.artifacts_found,
                bosses_defeated: state.bosses_defeated,
                regions_visited: state.visited_regions.len(),
            };
            let quest = state.quests.accept(id, &snap)?;
            Ok(format!("accepted {}", quest.title))
        }
        PlayerAction::CompleteQuest { id } => complete_quest(ctx, id),
        PlayerAction::RefreshQuests => {
            let state = &mut *ctx.state;
            state
                .quests
                .refresh(ctx.rng, &mut state.resources, state.depth, state.level)?;
            Ok(format!("{} new contracts posted", state.quests.offers.len()))
        }
        PlayerAction::Craft { recipe: id, times } => {
            let state = &mut *ctx.state;
            let facilities: BTreeSet<Facility> = state
                .current_base()
                .filter(|b| b.is_active())
                .map(|b| b.facilities.clone())
                .unwrap_or_default();
            let (kind, produced) = craft(recipe(id)?, *times, &mut state.resources, &facilities)?;
            Ok(format!("produced {produced} {kind}"))
        }
        PlayerAction::Trade { offer } => {
            require_city(ctx)?;
            let offer = trade_offer(offer)?;
            trade(&mut ctx.state.resources, offer.cost, offer.reward)?;
            Ok(format!("trade {} done", offer.id))
        }
        PlayerAction::Repair => {
            require_city(ctx)?;
            let state = &mut *ctx.state;
            let max = state.max_integrity();
            let (kind, cost) = repair(&mut state.resources, &mut state.vitals, state.depth, max)?;
            Ok(format!("hull repaired for {cost} {kind}"))
        }
        PlayerAction::LaunchExpedition {
            difficulty,
            drones,
            target,
        } => {
            require_city(ctx)?;
            let state = &mut *ctx.state;
            let expedition = launch_expedition(
                ctx.rng,
                &mut state.resources,
                &state.expeditions,
                *difficulty,
                *drones,
                *target,
                now,
            )?;
            let message = format!(
                "{} {} launched with {drones} drones after {target}, back in {} min",
                difficulty.name(),
                expedition.short_id(),
                expedition.duration_ms / 60_000
            );
            state.expeditions.push(expedition);
            Ok(message)
        }
        PlayerAction::CollectExpedition { id } => {
            require_city(ctx)?;
            let state = &mut *ctx.state;
            let expedition = collect_expedition(&mut state.expeditions, id, &mut state.resources)?;
            if expedition.status == ExpeditionStatus::Failed {
                return Ok(format!(
                    "expedition {} was lost with {} drones",
                    expedition.short_id(),
                    expedition.lost_drones
                ));
            }
            let haul: Vec<String> = expedition
                .rewards
                .iter()
                .map(|(kind, amount)| format!("{amount} {kind}"))
                .collect();
            Ok(format!("expedition {} collected: {}", expedition.short_id(), haul.join(", ")))
        }
        PlayerAction::CancelExpedition { id } => {
            let state = &mut *ctx.state;
            let refund = cancel_expedition(&mut state.expeditions, id, &mut state.resources)?;
            Ok(format!("expedition recalled, {refund} nano_swarm refunded"))
        }
        PlayerAction::Heal => {
            require_city(ctx)?;
            ctx.state.vitals.heal();
            Ok("drill cooled to 0".into())
        }
        PlayerAction::Gamble { resource, amount } => {
            require_city(ctx)?;
            let net = gamble(ctx.rng, &mut ctx.state.resources, *resource, *amount)?;
            if net > 0.0 {
                Ok(format!("won {net} {resource}"))
            } else {
                Ok(format!("lost {} {resource}", -net))
            }
        }
        PlayerAction::Buff { effect } => {
            require_city(ctx)?;
            let offer = buff_offer(effect)?;
            let fx = buy_buff(&mut ctx.state.resources, offer.cost, offer.resource, offer.effect_id)?;
            let message = format!("{} started", fx.name);
            let id = fx.id.clone();
            ctx.state.start_effect(ctx.rng, fx);
            ctx.emit(SimEventKind::EffectApplied { id }, message.clone());
            Ok(message)
        }
        PlayerAction::Ability { kind } => {
            let state = &mut *ctx.state;
            state.abilities.check(*kind, state.vitals.heat, state.level)?;
            state.abilities.enqueue(*kind);
            Ok(format!("{} queued", kind.def().name))
        }
        PlayerAction::Analyze { artifact } => {
            let state = &mut *ctx.state;
            if state.analysis.is_some() {
                return Err(not_allowed("the analyzer is busy"));
            }
            let item = state.inventory.find(artifact)?;
            let Some(entry) = state.inventory.get(&item) else {
                return Err(not_allowed(format!("artifact {artifact} is gone")));
            };
            if entry.identified {
                return Err(not_allowed(format!("{} is already identified", entry.def_id)));
            }
            let def = artifact_def(&entry.def_id)?;
            let time_left = def.rarity.analysis_secs();
            state.analysis = Some(Analysis { item, time_left });
            Ok(format!("analysing {}, {time_left:.0} s", def.name))
        }
        PlayerAction::Equip { artifact } => {
            let state = &mut *ctx.state;
            let item = state.inventory.find(artifact)?;
            state.inventory.equip(&item)?;
            Ok(format!("equipped {artifact}"))
        }
        PlayerAction::Unequip { artifact } => {
            let state = &mut *ctx.state;
            let item = state.inventory.find(artifact)?;
            state.inventory.unequip(&item)?;
            Ok(format!("unequipped {artifact}"))
        }
        PlayerAction::SellArtifact { artifact } => {
            require_city(ctx)?;
            let state = &mut *ctx.state;
            let item = state.inventory.find(artifact)?;
            if state.analysis.is_some_and(|a| a.item == item) {
                return Err(not_allowed("artifact is in the analyzer"));
            }
            let Some(entry) = state.inventory.get(&item) else {
                return Err(not_allowed(format!("artifact {artifact} is gone")));
            };
            if entry.equipped {
                return Err(not_allowed("unequip the artifact first"));
            }
            let def = artifact_def(&entry.def_id)?;
            let mut price = def.base_price;
            if state.has_perk(Perk::ResearchGrant) {
                price *= 1.0 + Perk::ResearchGrant.value();
            }
            state.inventory.remove(&item);
            state.resources.add(ResourceKind::Rubies, price);
            Ok(format!("sold {} for {price:.0} rubies", def.name))
        }
        PlayerAction::UpgradePart { slot } => {
            let state = &mut *ctx.state;
            let next = state.drill.next_part(*slot)?;
            if next.tier > CITY_WORKSHOP_MAX_TIER {
                let covered = state
                    .current_base()
                    .filter(|b| b.is_active())
                    .and_then(|b| b.base_type.workshop_tiers())
                    .is_some_and(|(lo, hi)| (lo..=hi).contains(&next.tier));
                if !covered {
                    return Err(not_allowed(format!(
                        "tier {} parts need a base workshop in this region",
                        next.tier
                    )));
                }
            }
            state.resources.spend(&upgrade_cost(*slot, next.tier))?;
            let message = format!("installed {} (tier {})", next.name, next.tier);
            state.drill.equip(next);
            Ok(message)
        }
        PlayerAction::UpgradeSkill { id } => {
            let state = &mut *ctx.state;
            let def = skill_def(id)?;
            let cost = [(ResourceKind::Rubies, skill_cost(def, state.skills.level(def.id)))];
            state.resources.check_afford(&cost)?;
            let level = state.skills.level_up(def.id)?;
            state.resources.spend(&cost)?;
            Ok(format!("{} is now level {level}", def.name))
        }
        PlayerAction::Minigame { success } => {
            let state = &mut *ctx.state;
            let (Some(boss), Some(_)) = (state.boss.as_mut(), state.minigame) else {
                return Err(not_allowed("no minigame is running"));
            };
            let damage = boss.complete_minigame(*success);
            state.minigame = None;
            state.vitals.integrity = (state.vitals.integrity - damage).max(0.0);
            if *success {
                Ok("weak spot hit".into())
            } else {
                Ok(format!("minigame failed, hull -{damage}"))
            }
        }
        PlayerAction::Drone { kind } => {
            let state = &mut *ctx.state;
            let level = state.drones.upgrade(*kind, &mut state.resources)?;
            Ok(format!("{kind} drone level {level}"))
        }
    }
}

fn travel(ctx: &mut SimContext<'_>, to: RegionId) -> SimResult<String> {
    let now = ctx.now_ms();
    let state = &mut *ctx.state;
    let from = state.region;
    if state.is_traveling() {
        return Err(not_allowed("already travelling"));
    }
    if to == from {
        return Err(not_allowed(format!("already in {to}")));
    }
    if state.boss.is_some() {
        return Err(not_allowed("cannot leave during a boss fight"));
    }
    if now < state.travel_blocked_until_ms {
        let secs = (state.travel_blocked_until_ms - now).div_ceil(1000);
        return Err(not_allowed(format!("routes are blocked for {secs} s")));
    }
    if !state.licenses.has_active_permit(to, now) {
        return Err(not_allowed(format!("no permit for {to}")));
    }

    let mut duration_ms = travel_time_ms(from, to);
    if state.has_perk(Perk::Smuggler) {
        duration_ms = (duration_ms as f64 * (1.0 - Perk::Smuggler.value())).round() as u64;
    }
    state.drilling = false;
    state.travel = Some(Travel {
        from,
        to,
        start_ms: now,
        duration_ms,
    });
    let minutes = duration_ms.div_ceil(60_000);
    let message = format!("left for {} ({minutes} min)", to.info().name);
    ctx.emit(SimEventKind::Departed { to }, message.clone());
    Ok(message)
}

fn complete_quest(ctx: &mut SimContext<'_>, id: &str) -> SimResult<String> {
    let now = ctx.now_ms();
    let state = &mut *ctx.state;
    let title = state
        .quests
        .active
        .get(id)
        .map(|q| q.title.clone())
        .unwrap_or_else(|| id.to_string());
    let payout = state.quests.complete(
        id,
        &mut state.resources,
        &mut state.bases,
        &mut state.reputation,
    )?;
    if let Some(tier) = state.licenses.add_global_reputation(QUEST_GLOBAL_REPUTATION) {
        info!(tier, "license tier up");
    }
    for change in payout.reputation.iter().filter(|c| c.leveled_up()) {
        info!(faction = %change.faction, level = change.new_level, "faction level up");
    }
    for unlock in &payout.unlocks {
        state.apply_unlock(unlock, now);
    }
    state.blueprints.extend(payout.blueprints.iter().cloned());
    let level = state.add_xp(payout.xp);

    let message = format!("{title} complete");
    ctx.emit(
        SimEventKind::QuestCompleted { id: id.to_string() },
        message.clone(),
    );
    if let Some(level) = level {
        ctx.emit(SimEventKind::LevelUp { level }, format!("reached level {level}"));
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::event::EventLog;
    use crate::state::GameState;
    use cx_core::artifact::ARTIFACTS;
    use cx_mechanics::MinigameKind;
    use cx_mechanics::combat::spawn_boss;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn act_at(state: &mut GameState, line: &str, tick: u64) -> (SimResult<String>, EventLog) {
        let clock = SimClock::resume(0, 100, tick);
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(11);
        let mut ctx = SimContext {
            state,
            clock: &clock,
            events: &mut events,
            rng: &mut rng,
        };
        let result = PlayerAction::parse(line).and_then(|a| apply_action(&mut ctx, &a));
        (result, events)
    }

    fn act(state: &mut GameState, line: &str) -> SimResult<String> {
        act_at(state, line, 0).0
    }

    fn rich() -> GameState {
        let mut state = GameState::new();
        for kind in ResourceKind::ALL {
            state.resources.add(kind, 1_000_000.0);
        }
        state
    }

    #[test]
    fn parses_common_commands() {
        assert_eq!(PlayerAction::parse("drill start").unwrap(), PlayerAction::StartDrilling);
        assert_eq!(
            PlayerAction::parse("travel iron-gates").unwrap(),
            PlayerAction::Travel { to: RegionId::IronGates }
        );
        assert_eq!(
            PlayerAction::parse("buy iron 50").unwrap(),
            PlayerAction::Buy {
                resource: ResourceKind::Iron,
                amount: 50.0
            }
        );
        assert_eq!(
            PlayerAction::parse("permit crystal_wastes perm").unwrap(),
            PlayerAction::BuyPermit {
                region: RegionId::CrystalWastes,
                kind: PermitKind::Permanent
            }
        );
        assert_eq!(
            PlayerAction::parse("caravan send rust_valley iron_gates 1star iron:100,copper:5").unwrap(),
            PlayerAction::SendCaravan {
                from: "rust_valley".into(),
                to: "iron_gates".into(),
                tier: CaravanTier::OneStar,
                cargo: vec![(ResourceKind::Iron, 100.0), (ResourceKind::Copper, 5.0)],
            }
        );
        assert_eq!(
            PlayerAction::parse("sell artifact ab12").unwrap(),
            PlayerAction::SellArtifact { artifact: "ab12".into() }
        );
        assert_eq!(
            PlayerAction::parse("craft clay_to_oil").unwrap(),
            PlayerAction::Craft {
                recipe: "clay_to_oil".into(),
                times: 1
            }
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        for line in ["", "fly away", "buy iron", "buy iron -5", "travel atlantis", "drill sideways"] {
            assert!(
                matches!(PlayerAction::parse(line), Err(SimError::Parse { .. })),
                "{line}"
            );
        }
    }

    #[test]
    fn drilling_toggles_and_is_logged() {
        let mut state = GameState::new();
        let (result, log) = act_at(&mut state, "drill start", 0);
        assert_eq!(result.unwrap(), "drill started");
        assert!(state.drilling);
        assert_eq!(log.with_label("action").len(), 1);

        state.stuck = true;
        state.drilling = false;
        assert!(matches!(act(&mut state, "drill start"), Err(SimError::NotAllowed(_))));
    }

    #[test]
    fn travel_needs_a_permit() {
        let mut state = rich();
        assert!(act(&mut state, "travel crystal_wastes").is_err());
        act(&mut state, "license green").unwrap();
        act(&mut state, "permit crystal_wastes temp").unwrap();
        state.drilling = true;

        let (result, log) = act_at(&mut state, "travel crystal_wastes", 0);
        result.unwrap();
        assert!(!state.drilling);
        let travel = state.travel.unwrap();
        assert_eq!(travel.duration_ms, travel_time_ms(RegionId::RustValley, RegionId::CrystalWastes));
        assert_eq!(log.with_label("depart").len(), 1);
        assert!(act(&mut state, "travel iron_gates").is_err());
    }

    #[test]
    fn blocked_routes_hold_the_player() {
        let mut state = rich();
        act(&mut state, "license green").unwrap();
        act(&mut state, "permit crystal_wastes temp").unwrap();
        state.travel_blocked_until_ms = 5_000;
        assert!(act_at(&mut state, "travel crystal_wastes", 10).0.is_err());
        assert!(act_at(&mut state, "travel crystal_wastes", 50).0.is_ok());
    }

    #[test]
    fn rejected_actions_change_nothing() {
        let mut state = GameState::new();
        let before = state.clone();
        assert!(act(&mut state, "buy iron 10").is_err());
        assert!(act(&mut state, "build base outpost").is_err());
        assert!(act(&mut state, "upgrade part bit").is_err());
        assert!(act(&mut state, "dismiss").is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn station_market_round_trip() {
        let mut state = rich();
        act(&mut state, "build base station").unwrap();
        // stations take time to build
        assert!(act(&mut state, "buy iron 10").is_err());

        state.bases.complete_construction(u64::MAX);
        let rubies = state.resources.get(ResourceKind::Rubies);
        act(&mut state, "buy iron 10").unwrap();
        assert!(state.resources.get(ResourceKind::Rubies) < rubies);
        act(&mut state, "sell iron 10").unwrap();
        assert_eq!(state.market_history.len(), 2);
    }

    #[test]
    fn part_upgrades_follow_workshop_tiers() {
        let mut state = rich();
        act(&mut state, "upgrade part bit").unwrap();
        act(&mut state, "upgrade part bit").unwrap();
        assert_eq!(state.drill.tier(DrillSlot::Bit), CITY_WORKSHOP_MAX_TIER);
        assert!(act(&mut state, "upgrade part bit").is_err());

        act(&mut state, "build base camp").unwrap();
        state.bases.complete_construction(u64::MAX);
        act(&mut state, "upgrade part bit").unwrap();
        assert_eq!(state.drill.tier(DrillSlot::Bit), 4);
    }

    #[test]
    fn skills_cost_rubies() {
        let mut state = GameState::new();
        state.resources.add(ResourceKind::Rubies, 100.0);
        act(&mut state, "upgrade skill drill_mastery").unwrap();
        assert_eq!(state.skills.level("drill_mastery"), 1);
        assert_eq!(state.resources.get(ResourceKind::Rubies), 0.0);
        assert!(act(&mut state, "upgrade skill drill_mastery").is_err());
        assert_eq!(state.skills.level("drill_mastery"), 1);
    }

    #[test]
    fn city_services_need_a_parked_drill() {
        let mut state = rich();
        state.vitals.heat = 60.0;
        state.drilling = true;
        assert!(act(&mut state, "heal").is_err());
        state.drilling = false;
        act(&mut state, "heal").unwrap();
        assert_eq!(state.vitals.heat, 0.0);

        act(&mut state, "buff bar_oil_stout").unwrap();
        assert!(state.effects.iter().any(|e| e.id == "BAR_OIL_STOUT"));
        act(&mut state, "trade clay_for_rubies").unwrap();
    }

    #[test]
    fn expeditions_launch_collect_and_recall() {
        assert_eq!(
            PlayerAction::parse("expedition launch low 3 iron").unwrap(),
            PlayerAction::LaunchExpedition {
                difficulty: ExpeditionDifficulty::Low,
                drones: 3,
                target: ResourceKind::Iron,
            }
        );
        assert!(PlayerAction::parse("expedition launch low many iron").is_err());

        let mut state = GameState::new();
        assert!(act(&mut state, "expedition launch low 3 iron").is_err());
        assert!(state.expeditions.is_empty());

        let mut state = rich();
        let before = state.resources.get(ResourceKind::NanoSwarm);
        act(&mut state, "expedition launch low 3 iron").unwrap();
        assert_eq!(state.resources.get(ResourceKind::NanoSwarm), before - 30.0);
        let id = state.expeditions[0].short_id();
        assert!(act(&mut state, &format!("expedition collect {id}")).is_err());

        act(&mut state, &format!("expedition cancel {id}")).unwrap();
        assert!(state.expeditions.is_empty());
        assert_eq!(state.resources.get(ResourceKind::NanoSwarm), before - 15.0);
    }

    #[test]
    fn expeditions_launch_from_the_city_only() {
        let mut state = rich();
        state.drilling = true;
        assert!(act(&mut state, "expedition launch medium 2 gold").is_err());
        state.drilling = false;
        act(&mut state, "expedition launch medium 2 gold").unwrap();
        assert_eq!(state.expeditions[0].difficulty, ExpeditionDifficulty::Medium);
    }

    #[test]
    fn black_market_rewards_apply() {
        let mut state = rich();
        assert!(act(&mut state, "bm bm_shield_generator").is_err());
        state.apply_unlock("black_market", 0);
        state
            .reputation
            .add_reputation(cx_core::faction::FactionId::Rebels, 100);
        act(&mut state, "bm bm_shield_generator").unwrap();
        assert_eq!(state.shield_charge, 50.0);
    }

    #[test]
    fn artifacts_analyse_equip_and_sell() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = GameState::new();
        let def = &ARTIFACTS[0];
        let id = state.grant_artifact(&mut rng, def, 0);
        let short = id.to_string()[..8].to_string();

        assert!(act(&mut state, &format!("equip {short}")).is_err());
        act(&mut state, &format!("analyze {short}")).unwrap();
        assert_eq!(state.analysis.unwrap().time_left, def.rarity.analysis_secs());
        assert!(act(&mut state, &format!("sell artifact {short}")).is_err());

        state.analysis = None;
        state.inventory.get_mut(&id).unwrap().identified = true;
        act(&mut state, &format!("equip {short}")).unwrap();
        assert!(act(&mut state, &format!("sell artifact {short}")).is_err());
        act(&mut state, &format!("unequip {short}")).unwrap();
        act(&mut state, &format!("sell artifact {short}")).unwrap();
        assert!(state.inventory.is_empty());
        assert_eq!(state.resources.get(ResourceKind::Rubies), def.base_price);
    }

    #[test]
    fn minigame_result_hits_the_boss() {
        let mut state = GameState::new();
        assert!(act(&mut state, "minigame win").is_err());
        let boss = spawn_boss(5_000.0);
        let max_hp = boss.max_hp;
        state.boss = Some(boss);
        state.minigame = Some(MinigameKind::Mash);
        act(&mut state, "minigame win").unwrap();
        assert!(state.minigame.is_none());
        assert!(state.boss.as_ref().unwrap().hp < max_hp);

        state.minigame = Some(MinigameKind::Mash);
        let hull = state.vitals.integrity;
        act(&mut state, "minigame lose").unwrap();
        assert!(state.vitals.integrity < hull);
    }

    #[test]
    fn quests_accept_and_complete() {
        let mut state = GameState::new();
        act(&mut state, "quest accept QUEST_ANCIENT_RUINS").unwrap();
        assert!(act(&mut state, "quest complete QUEST_ANCIENT_RUINS").is_err());

        state.artifacts_found = 5;
        let before = state.clone();
        state.quests.update(&before.progress_snapshot());
        let (result, log) = act_at(&mut state, "quest complete QUEST_ANCIENT_RUINS", 0);
        result.unwrap();
        assert!(state.quests.completed.contains("QUEST_ANCIENT_RUINS"));
        assert_eq!(log.with_label("quest").len(), 1);
        assert!(state.licenses.global_reputation >= QUEST_GLOBAL_REPUTATION);
    }

    #[test]
    fn drones_and_abilities() {
        let mut state = rich();
        act(&mut state, "drone repair").unwrap();
        assert_eq!(state.drones.level(DroneKind::Repair), 1);

        state.level = 50;
        act(&mut state, "ability barrier").unwrap();
        assert_eq!(state.abilities.drain_queue(), vec![AbilityKind::Barrier]);
    }

    #[test]
    fn cooling_game_vents_heat() {
        let mut state = GameState::new();
        state.vitals.heat = 50.0;
        assert!(act(&mut state, "vent").is_err());
        act(&mut state, "cool start").unwrap();
        act(&mut state, "vent").unwrap();
        assert!(state.vitals.heat < 50.0);
        act(&mut state, "cool stop").unwrap();
        assert!(!state.vitals.cooling_game);
    }
}
