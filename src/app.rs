use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use padoracle::{
    pkcs7_pad, pkcs7_unpad, CommandOracle, PaddingOracleAttack, Verification, DEFAULT_BLOCK_SIZE,
};

#[derive(Args)]
struct OracleArgs {
    /// Hex-encoded ciphertext, IV first.
    ciphertext: String,

    /// Program that exits successfully when the hex ciphertext passed as its
    /// last argument has valid padding.
    #[arg(short, long)]
    oracle: String,

    /// Extra arguments passed to the oracle program before the ciphertext.
    #[arg(last = true)]
    oracle_args: Vec<String>,

    #[arg(short, long, env = "PADORACLE_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,
}

impl OracleArgs {
    fn attack(&self) -> Result<PaddingOracleAttack<CommandOracle>> {
        let oracle = CommandOracle::new(&self.oracle, &self.oracle_args);
        Ok(PaddingOracleAttack::new(oracle).with_block_size(self.block_size)?)
    }

    fn ciphertext(&self) -> Result<Vec<u8>> {
        decode_hex(&self.ciphertext)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recover the plaintext of a ciphertext.
    Decrypt {
        #[command(flatten)]
        oracle: OracleArgs,

        /// Accept the first candidate the oracle accepts for the last byte of
        /// each block, without a confirming query.
        #[arg(long)]
        first_success: bool,

        /// Attack blocks and candidates concurrently.
        #[arg(long)]
        parallel: bool,

        /// Print the plaintext as hex.
        #[arg(long)]
        hex: bool,
    },

    /// Find the length of the plaintext of a ciphertext.
    Size {
        #[command(flatten)]
        oracle: OracleArgs,
    },

    /// Apply PKCS#7 padding to hex data.
    Pad {
        data: String,

        #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE as u8)]
        block_size: u8,
    },

    /// Strip PKCS#7 padding from hex data.
    Unpad { data: String },
}

#[derive(Parser)]
#[command(name = "padoracle", version, about = "Decrypt CBC ciphertexts using a padding oracle.")]
pub struct App {
    /// Log progress. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();
        let default_level = match app.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(app)
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Decrypt {
                oracle,
                first_success,
                parallel,
                hex,
            } => Self::decrypt(&oracle, first_success, parallel, hex),
            Commands::Size { oracle } => {
                let ciphertext = oracle.ciphertext()?;
                let size = oracle
                    .attack()?
                    .size(&ciphertext)
                    .context("failed to find plaintext size")?;
                println!("{size}");
                Ok(())
            }
            Commands::Pad { data, block_size } => {
                anyhow::ensure!(block_size > 0, "block size must be positive");
                println!("{}", hex::encode(pkcs7_pad(&decode_hex(&data)?, block_size)));
                Ok(())
            }
            Commands::Unpad { data } => {
                println!("{}", hex::encode(pkcs7_unpad(&decode_hex(&data)?)?));
                Ok(())
            }
        }
    }

    fn decrypt(args: &OracleArgs, first_success: bool, parallel: bool, as_hex: bool) -> Result<()> {
        let ciphertext = args.ciphertext()?;
        let verification = if first_success {
            Verification::FirstSuccess
        } else {
            Verification::LastByte
        };
        let mut attack = args.attack()?.with_verification(verification);
        info!(
            blocks = ciphertext.len() / attack.block_size(),
            parallel, "decrypting"
        );

        let plaintext = if parallel {
            attack.decrypt_par(&ciphertext)
        } else {
            attack.decrypt(&ciphertext)
        }
        .context("padding oracle attack failed")?;

        if as_hex {
            println!("{}", hex::encode(&plaintext));
        } else {
            println!("{}", String::from_utf8_lossy(&plaintext));
        }
        Ok(())
    }
}

fn decode_hex(data: &str) -> Result<Vec<u8>> {
    hex::decode(data.trim()).with_context(|| format!("invalid hex: {data}"))
}
