/*!
 * smbrelay CLI
 *
 * Thin front-end over the operations facade. Connection settings come from
 * the SMB_* environment variables; results are printed as JSON so the output
 * can be piped into other tooling.
 */

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use smbrelay::{logging, SmbConfig, SmbOperations};

#[derive(Parser)]
#[command(name = "smbrelay", version, about = "Relay file operations onto an SMB share via smbclient")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List files at a path on the share
    Ls {
        /// Remote path, relative to the configured base path
        #[arg(default_value = "")]
        path: String,
    },
    /// Upload a local file to the share
    Put {
        /// Local file to upload
        local: PathBuf,
        /// Remote destination path
        remote: String,
        /// Replace the remote file if it already exists
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete a file from the share
    Del {
        /// Remote path of the file to delete
        remote: String,
    },
    /// Check connectivity to the server, share and base path
    Health,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cfg = SmbConfig::from_env();
    let missing = cfg.missing_required();
    if !missing.is_empty() {
        bail!("missing required environment variables: {}", missing.join(", "));
    }

    let ops = SmbOperations::new();

    match cli.command {
        Command::Ls { path } => {
            let entries = ops.list_files(&path, &cfg)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).context("serializing listing")?
            );
        }
        Command::Put {
            local,
            remote,
            overwrite,
        } => {
            ops.upload_file(&local, &remote, &cfg, overwrite)?;
            println!("uploaded {} to {}", local.display(), remote);
        }
        Command::Del { remote } => {
            ops.delete_file(&remote, &cfg)?;
            println!("deleted {}", remote);
        }
        Command::Health => {
            let result = ops.check_health(&cfg);
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("serializing health result")?
            );
            if !result.is_healthy() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
