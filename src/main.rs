//! Dice Keygen CLI
//!
//! Interactive, air-gapped generation of reproducible OpenPGP keys from
//! dice rolls and transcribed OS entropy.

use clap::{Parser, Subcommand};
use dice_keygen::{
    collection::{Collector, CommandEntropySource, EntropySource, OsEntropySource},
    config::{FileConfig, SamplerKind},
    expansion::{is_exhaustion_panic, ExpansionStream, ExpansionVariant},
    keygen::{GpgImporter, Identity, KeyMaterialProducer, KeyringImporter, Pem2OpenPgp},
    mixing::{EntropyMixer, MixedSecret},
    session::{Prompter, Session, SessionError},
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Exit code for a declined safety check.
const SAFETY_ABORT_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "dice-keygen", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Expansion strategy (xof or kdf).
    #[arg(long, global = true)]
    variant: Option<ExpansionVariant>,

    /// Keystream capacity in bytes.
    #[arg(long, global = true)]
    buffer_len: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full interactive session: checklist, collection, mixing, keys.
    Session,
    /// Display OS entropy samples for transcription.
    Collect {
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long, default_value_t = 20)]
        bytes: usize,
    },
    /// Prompt for dice and computer entropy and print the mixed secret.
    Mix {
        /// Minimum dice rolls (defaults to the configured minimum).
        #[arg(long)]
        dice: Option<usize>,
        /// Minimum computer-entropy bytes (defaults to the configured minimum).
        #[arg(long)]
        bytes: Option<usize>,
    },
    /// Print keystream bytes for a seed, for reproducibility audits.
    Expand {
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 32)]
        bytes: usize,
        #[arg(long, default_value_t = 0)]
        skip: usize,
    },
    /// Generate a key from a known mixed secret.
    Generate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// 64 hex characters.
        #[arg(long)]
        secret: String,
        /// Import the packet into the keyring.
        #[arg(long)]
        import: bool,
        /// Write the PKCS#1 PEM to stdout instead of converting.
        #[arg(long, conflicts_with = "import")]
        pem_only: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] dice_keygen::config::ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Collect(#[from] dice_keygen::collection::CollectError),
    #[error(transparent)]
    Mix(#[from] dice_keygen::mixing::MixError),
    #[error(transparent)]
    Expansion(#[from] dice_keygen::ExpansionError),
    #[error(transparent)]
    Keygen(#[from] dice_keygen::KeygenError),
    #[error(transparent)]
    Tool(#[from] dice_keygen::keygen::ToolError),
    #[error("output failed: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    // Initialize logging on stderr, away from prompts and packet output
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    quiet_exhaustion_panics();

    let cli = Cli::parse();
    info!("Dice Keygen v{}", dice_keygen::VERSION);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Session(SessionError::SafetyAbort)) => ExitCode::from(SAFETY_ABORT_EXIT),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Keeps the default hook from printing exhaustion unwinds. The key
/// producer catches them and reports a regular error instead.
fn quiet_exhaustion_panics() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if !is_exhaustion_panic(info.payload()) {
            previous(info);
        }
    }));
}

fn load_config(cli: &Cli) -> Result<FileConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(variant) = cli.variant {
        config.expansion.variant = variant;
    }
    if let Some(buffer_len) = cli.buffer_len {
        config.expansion.buffer_len = buffer_len;
    }
    config.validate()?;
    Ok(config)
}

fn entropy_source(config: &FileConfig) -> Result<Box<dyn EntropySource>, CliError> {
    Ok(match config.collection.sampler {
        SamplerKind::Os => Box::new(OsEntropySource::new()),
        SamplerKind::Command => Box::new(CommandEntropySource::new(&config.collection.command)?),
    })
}

fn producer(config: &FileConfig) -> Result<KeyMaterialProducer, CliError> {
    Ok(KeyMaterialProducer::new()
        .expansion(config.expansion.clone())
        .modulus_bits(config.keygen.modulus_bits)
        .creation_time(config.keygen.creation_time()?))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Session => {
            let prompter = Prompter::new(io::stdin().lock(), io::stdout());
            let mut session = Session::new(prompter, &config);
            let mut source = entropy_source(&config)?;
            let converter = Pem2OpenPgp::new(&config.keygen.converter)?;
            let importer = GpgImporter::new(&config.keygen.importer)?;

            let packets = session.run(&mut *source, &producer(&config)?, &converter, &importer)?;
            info!(keys = packets.len(), "Session complete");
        }
        Command::Collect { count, bytes } => {
            let mut collector = Collector::new(entropy_source(&config)?);
            collector.sample(count, bytes, &mut io::stdout())?;
        }
        Command::Mix { dice, bytes } => {
            let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
            let dice = prompter.dice_seed(dice.unwrap_or(config.entropy.min_dice_rolls))?;
            let computer =
                prompter.computer_seed(bytes.unwrap_or(config.entropy.min_entropy_bytes))?;
            let secret = EntropyMixer::new().mix(&dice, &computer)?;
            prompter.say(&format!("Mixed secret: {}", secret.as_hex()))?;
        }
        Command::Expand { seed, bytes, skip } => {
            let mut stream = ExpansionStream::with_params(seed.as_bytes(), &config.expansion)?;
            stream.read(skip)?;
            println!("{}", hex::encode(stream.read(bytes)?));
        }
        Command::Generate {
            name,
            email,
            secret,
            import,
            pem_only,
        } => {
            let secret = MixedSecret::from_hex(secret.trim())?;
            let producer = producer(&config)?;

            if pem_only {
                let material = producer.produce(secret.seed_material())?;
                io::stdout().write_all(material.raw())?;
                return Ok(());
            }

            let identity = Identity::new(name, email);
            let converter = Pem2OpenPgp::new(&config.keygen.converter)?;
            let (packet, material) =
                producer.generate(&identity, secret.seed_material(), &converter)?;
            info!(
                bytes_consumed = material.bytes_consumed(),
                packet_len = packet.len(),
                "Key generated"
            );

            if import {
                let importer = GpgImporter::new(&config.keygen.importer)?;
                importer.import(&packet)?;
            } else {
                io::stdout().write_all(packet.as_bytes())?;
            }
        }
    }

    Ok(())
}
