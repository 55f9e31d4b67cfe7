//! CLI commands for the stage ledger

use batchline_core::ledger::{FileLedgerBackend, StageLedger};
use batchline_core::manifest::ManifestStore;
use batchline_core::settings::Settings;

use crate::error::CliError;
use crate::output::{OutputFormat, print_json};

/// Arguments for the `ledger update` command
pub struct LedgerUpdateArgs {
    /// Stage whose count is advanced
    pub stage: String,
    /// Number of manifest entries to add
    pub delta: u64,
}

/// Handle the `ledger init` command
pub fn handle_ledger_init(settings: &Settings) -> Result<(), CliError> {
    let scope = settings.scope();
    let path = FileLedgerBackend::ledger_path(&scope);
    if StageLedger::file().init(&scope)? {
        println!("Initialized stage ledger at: {}", path.display());
    } else {
        println!("Stage ledger already exists at: {}", path.display());
    }
    Ok(())
}

/// Handle the `ledger show` command
pub fn handle_ledger_show(settings: &Settings, format: OutputFormat) -> Result<(), CliError> {
    let counts = StageLedger::file().read(&settings.scope())?;
    match format {
        OutputFormat::Json => print_json(&counts)?,
        OutputFormat::Text if counts.is_empty() => println!("No stages have run yet"),
        OutputFormat::Text => {
            for (stage, count) in counts.iter() {
                println!("{stage}\t{count}");
            }
        }
    }
    Ok(())
}

/// Handle the `ledger update` command
pub fn handle_ledger_update(settings: &Settings, args: &LedgerUpdateArgs) -> Result<(), CliError> {
    let scope = settings.scope();
    let ledger = StageLedger::file();
    let current = ledger.count(&scope, &args.stage)?;
    let total = ManifestStore::new(settings.manifest_path()).len()? as u64;
    if current.saturating_add(args.delta) > total {
        return Err(CliError::InvalidArgument(format!(
            "cannot advance {} from {} by {}: the manifest has {} entries",
            args.stage, current, args.delta, total
        )));
    }
    let count = ledger.update(&scope, &args.stage, args.delta)?;
    println!("{}\t{}", args.stage, count);
    Ok(())
}

/// Handle the `ledger backups` command
pub fn handle_ledger_backups(settings: &Settings) -> Result<(), CliError> {
    let scope = settings.scope();
    let backups = StageLedger::file().backups(&scope)?;
    if backups.is_empty() {
        println!("No ledger backups in {}", scope.dir().display());
    }
    for name in backups {
        println!("{}", scope.dir().join(name).display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_update() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path(), "en");
        std::fs::create_dir_all(dir.path().join("en")).unwrap();
        std::fs::write(settings.manifest_path(), "a\n".repeat(12)).unwrap();
        handle_ledger_init(&settings).unwrap();
        handle_ledger_init(&settings).unwrap();

        let args = LedgerUpdateArgs {
            stage: "xml2txt".into(),
            delta: 5,
        };
        handle_ledger_update(&settings, &args).unwrap();
        handle_ledger_update(&settings, &args).unwrap();

        let counts = StageLedger::file().read(&settings.scope()).unwrap();
        assert_eq!(counts.get("xml2txt"), 10);
        handle_ledger_backups(&settings).unwrap();
        handle_ledger_show(&settings, OutputFormat::Json).unwrap();
    }

    #[test]
    fn test_update_without_init_fails() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path(), "en");
        let args = LedgerUpdateArgs {
            stage: "xml2txt".into(),
            delta: 1,
        };
        let err = handle_ledger_update(&settings, &args).unwrap_err();
        assert!(matches!(err, CliError::Ledger(_)));
    }

    #[test]
    fn test_update_past_manifest_end_is_refused() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path(), "en");
        std::fs::create_dir_all(dir.path().join("en")).unwrap();
        std::fs::write(settings.manifest_path(), "a\nb\nc\nd\n").unwrap();
        handle_ledger_init(&settings).unwrap();

        let args = LedgerUpdateArgs {
            stage: "xml2txt".into(),
            delta: 100,
        };
        let err = handle_ledger_update(&settings, &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));

        let args = LedgerUpdateArgs {
            stage: "xml2txt".into(),
            delta: 4,
        };
        handle_ledger_update(&settings, &args).unwrap();
        let counts = StageLedger::file().read(&settings.scope()).unwrap();
        assert_eq!(counts.get("xml2txt"), 4);
    }
}
