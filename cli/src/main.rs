use std::{fs, path::Path, path::PathBuf};

use anyhow::{bail, Context};
use chargen_engine::catalog::is_yaml;
use chargen_engine::summary::render_text;
use chargen_engine::{
    format_coins, BuildConfig, BuildError, Builder, CharacterBuildState, ClassId, Coins,
    EquipmentRequest, PurchaseAction, SpecialItemRef, SpecialKind, SpellTier, StepInput,
    WeaponCategory, WeaponRef,
};
use clap::{Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;
use indexmap::IndexMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Copy, Clone, ValueEnum)]
enum Section {
    Weapons,
    Armor,
    Gear,
    Spells,
}

#[derive(Subcommand)]
enum Cmd {
    /// Discard the saved build and start over
    New,
    /// Roll 4d6 (re-rolling 1s and 2s, dropping the lowest) for each ability
    Roll {
        /// RNG seed for determinism; random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Enter ability scores by hand, e.g. --score str=15 --score dex=14
    SetAbilities {
        #[arg(long = "score", required = true)]
        scores: Vec<String>,
    },
    /// Choose a race (Elf, Dwarf, Halfling, Human)
    Race { race: String },
    /// Choose a class (Cleric, Fighter, Rogue, Wizard)
    Class {
        class: String,
        /// Primary ability; Fighters pick strength or dexterity
        #[arg(long)]
        primary: Option<String>,
    },
    /// Fighter only: fighting style plus two skills
    Fighter {
        #[arg(long)]
        style: Option<String>,
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    /// Choose class skills
    Skills { skills: Vec<String> },
    /// Rogue only: double proficiency in two chosen skills
    Expertise { skills: Vec<String> },
    /// Spellcasters only: three cantrips and six first-level spells
    Spells {
        #[arg(long = "cantrip")]
        cantrips: Vec<String>,
        #[arg(long = "spell")]
        first_level: Vec<String>,
    },
    /// Buy starting equipment
    Equip {
        #[arg(long)]
        armor: Option<String>,
        #[arg(long)]
        shield: Option<String>,
        /// category:name, e.g. martial_melee:Longsword
        #[arg(long = "weapon")]
        weapons: Vec<String>,
        /// Adventuring gear id, e.g. backpack
        #[arg(long = "gear")]
        gear: Vec<String>,
        /// category:id, e.g. arcane_focus:orb
        #[arg(long = "special")]
        special: Vec<String>,
        /// class:tier:spell, e.g. wizard:cantrip:fire_bolt
        #[arg(long = "scroll")]
        scrolls: Vec<String>,
        /// Price the selection without buying it
        #[arg(long, default_value_t = false)]
        preview: bool,
    },
    /// Name the character
    Name { name: String },
    /// Compute derived stats
    Finalize,
    /// Apply one step from a JSON file
    Apply { file: PathBuf },
    /// Print the character sheet of a finalized build
    Sheet {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the current stage and the next step
    Status,
    /// Dump a section of the catalog as JSON
    Catalog {
        #[arg(value_enum)]
        section: Section,
    },
}

#[derive(Parser)]
#[command(name = "chargen")]
#[command(about = "Step-by-step level-1 character builder")]
struct Cli {
    /// Build state file, created on first use
    #[arg(long, global = true, default_value = "chargen-state.json")]
    state: PathBuf,
    /// JSON or YAML build config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log engine transitions to stderr
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            let text = read_text_auto(path)?;
            BuildConfig::parse(&text, is_yaml(path))
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BuildConfig::default(),
    };
    let builder = Builder::new(config)?;

    let state = match cli.cmd {
        Cmd::New => {
            let state = CharacterBuildState::new();
            save_state(&cli.state, &state)?;
            println!("started a new build");
            return Ok(());
        }
        Cmd::Status => {
            let state = load_state(&cli.state)?;
            print_status(&state);
            return Ok(());
        }
        Cmd::Sheet { json } => {
            let state = load_state(&cli.state)?;
            let summary = builder.summary(&state).map_err(explain)?;
            if json {
                println!("{}", summary.to_json()?);
            } else {
                print!("{}", render_text(&summary));
            }
            return Ok(());
        }
        Cmd::Catalog { section } => {
            let catalog = builder.catalog();
            let out = match section {
                Section::Weapons => serde_json::to_string_pretty(&catalog.weapons)?,
                Section::Armor => serde_json::to_string_pretty(&(&catalog.armor, &catalog.shields))?,
                Section::Gear => serde_json::to_string_pretty(&(&catalog.gear, &catalog.special))?,
                Section::Spells => serde_json::to_string_pretty(&catalog.spells)?,
            };
            println!("{out}");
            return Ok(());
        }
        Cmd::Roll { seed } => {
            let state = load_state(&cli.state)?;
            let input = StepInput::RollAbilities { seed };
            builder.apply(&state, &input).map_err(explain)?.state
        }
        Cmd::SetAbilities { scores } => {
            let state = load_state(&cli.state)?;
            let input = StepInput::SetAbilities {
                scores: parse_scores(&scores)?,
            };
            builder.apply(&state, &input).map_err(explain)?.state
        }
        Cmd::Race { race } => {
            let state = load_state(&cli.state)?;
            builder.choose_race(&state, &race).map_err(explain)?
        }
        Cmd::Class { class, primary } => {
            let state = load_state(&cli.state)?;
            builder
                .choose_class(&state, &class, primary.as_deref())
                .map_err(explain)?
        }
        Cmd::Fighter { style, skills } => {
            let state = load_state(&cli.state)?;
            builder
                .fighter_options(&state, style.as_deref(), &skills)
                .map_err(explain)?
        }
        Cmd::Skills { skills } => {
            let state = load_state(&cli.state)?;
            builder.choose_skills(&state, &skills).map_err(explain)?
        }
        Cmd::Expertise { skills } => {
            let state = load_state(&cli.state)?;
            builder.choose_expertise(&state, &skills).map_err(explain)?
        }
        Cmd::Spells {
            cantrips,
            first_level,
        } => {
            let state = load_state(&cli.state)?;
            builder
                .choose_spells(&state, &cantrips, &first_level)
                .map_err(explain)?
        }
        Cmd::Equip {
            armor,
            shield,
            weapons,
            gear,
            special,
            scrolls,
            preview,
        } => {
            let state = load_state(&cli.state)?;
            let mut request = EquipmentRequest {
                armor,
                shield,
                gear,
                ..Default::default()
            };
            for raw in &weapons {
                request.weapons.push(parse_weapon(raw)?);
            }
            for raw in &special {
                request.special.push(parse_special(raw)?);
            }
            for raw in &scrolls {
                request.special.push(parse_scroll(raw)?);
            }
            let action = if preview {
                PurchaseAction::Preview
            } else {
                PurchaseAction::Purchase
            };
            let outcome = builder
                .purchase_equipment(&state, &request, action)
                .map_err(explain)?;
            let res = &outcome.resolution;
            println!("total: {}", format_coins(res.total_cost()));
            match res.remaining() {
                Some(left) => println!("remaining: {}", format_coins(left)),
                None => println!(
                    "remaining: -{}",
                    format_coins(Coins::from_copper(res.remaining_cp.unsigned_abs()))
                ),
            }
            println!("armor class: {}", outcome.armor_class);
            for warning in &res.warnings {
                println!("warning: {}", warning.reason);
            }
            if preview {
                return Ok(());
            }
            outcome.state
        }
        Cmd::Name { name } => {
            let state = load_state(&cli.state)?;
            builder.name_character(&state, &name).map_err(explain)?
        }
        Cmd::Finalize => {
            let state = load_state(&cli.state)?;
            builder.finalize(&state).map_err(explain)?
        }
        Cmd::Apply { file } => {
            let state = load_state(&cli.state)?;
            let text = read_text_auto(&file)?;
            let input: StepInput = serde_json::from_str(&text)
                .with_context(|| format!("failed to parse step JSON: {}", file.display()))?;
            builder.apply(&state, &input).map_err(explain)?.state
        }
    };

    save_state(&cli.state, &state)?;
    print_status(&state);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "chargen_engine=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Out-of-order steps get a pointer to the step to redo.
fn explain(err: BuildError) -> anyhow::Error {
    let hint = match &err {
        BuildError::OutOfOrder { expected, .. } => Some(format!("run the '{expected}' step first")),
        _ => None,
    };
    match hint {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => anyhow::Error::new(err),
    }
}

fn print_status(state: &CharacterBuildState) {
    println!("stage: {:?}", state.stage);
    match state.next_step() {
        Some(step) => println!("next: {step}"),
        None => println!("next: done"),
    }
}

fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn load_state(path: &Path) -> anyhow::Result<CharacterBuildState> {
    if !path.exists() {
        return Ok(CharacterBuildState::new());
    }
    let text = read_text_auto(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse build state: {}", path.display()))
}

fn save_state(path: &Path, state: &CharacterBuildState) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn parse_scores(raw: &[String]) -> anyhow::Result<IndexMap<String, i32>> {
    let mut map = IndexMap::new();
    for pair in raw {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("expected ability=score, got '{pair}'");
        };
        let value: i32 = value
            .trim()
            .parse()
            .with_context(|| format!("'{value}' is not a number"))?;
        map.insert(name.trim().to_string(), value);
    }
    Ok(map)
}

fn parse_weapon(raw: &str) -> anyhow::Result<WeaponRef> {
    let Some((category, name)) = raw.split_once(':') else {
        bail!("expected category:name, got '{raw}'");
    };
    Ok(WeaponRef {
        category: category.parse::<WeaponCategory>()?,
        name: name.trim().to_string(),
    })
}

fn parse_special(raw: &str) -> anyhow::Result<SpecialItemRef> {
    let Some((category, id)) = raw.split_once(':') else {
        bail!("expected category:id, got '{raw}'");
    };
    Ok(SpecialItemRef::Catalog {
        category: category.parse::<SpecialKind>()?,
        id: id.trim().to_string(),
    })
}

fn parse_scroll(raw: &str) -> anyhow::Result<SpecialItemRef> {
    let mut parts = raw.splitn(3, ':');
    let (Some(list), Some(tier), Some(spell)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected class:tier:spell, got '{raw}'");
    };
    Ok(SpecialItemRef::SpellScroll {
        list: list.parse::<ClassId>()?,
        tier: tier.parse::<SpellTier>()?,
        spell: spell.trim().to_string(),
    })
}
