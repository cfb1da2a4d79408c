//! Show or write the settings file.

use std::path::{Path, PathBuf};

use clap::Args;
use varidelay_config::{Settings, default_config_path};

#[derive(Args)]
pub struct ConfigArgs {
    /// Print the built-in defaults instead of the effective settings
    #[arg(long)]
    print_default: bool,

    /// Write the default settings to PATH ("-" for the default location)
    #[arg(long, value_name = "PATH")]
    write: Option<PathBuf>,
}

impl ConfigArgs {
    /// Whether the command reads the current settings file. Printing or
    /// writing the defaults does not, so both work while that file is broken.
    pub fn shows_effective(&self) -> bool {
        !self.print_default && self.write.is_none()
    }
}

pub fn run(args: ConfigArgs, settings: &Settings, loaded_from: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = args.write {
        let path = if path.as_os_str() == "-" {
            default_config_path()
        } else {
            path
        };
        Settings::default().save(&path)?;
        tracing::info!(path = %path.display(), "default settings written");
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if args.print_default {
        print!("{}", Settings::default().to_toml()?);
    } else {
        println!("{}", source_line(loaded_from, &default_config_path()));
        print!("{}", settings.to_toml()?);
    }
    Ok(())
}

/// TOML comment naming where the effective settings came from.
fn source_line(loaded_from: Option<&Path>, default_path: &Path) -> String {
    match loaded_from {
        Some(path) => format!("# settings from {}", path.display()),
        None if default_path.is_file() => format!("# settings from {}", default_path.display()),
        None => format!("# built-in defaults (no file at {})", default_path.display()),
    }
}
