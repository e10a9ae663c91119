use clap::Args;
use praktijk::config::AppConfig;
use praktijk::error::AppError;
use praktijk::records::{DocumentStore, StoreError};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct RecordsArgs {
    /// Read this document instead of the configured DATA_FILE
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

fn open_store(args: RecordsArgs) -> Result<DocumentStore, AppError> {
    let path = match args.data_file {
        Some(path) => path,
        None => AppConfig::load()?.storage.data_file,
    };
    Ok(DocumentStore::new(path))
}

/// Print the document the site would serve, empty fallback included.
pub(crate) fn run_list(args: RecordsArgs) -> Result<(), AppError> {
    let store = open_store(args)?;
    let document = store.load();
    let rendered = serde_json::to_string_pretty(&document).map_err(StoreError::Serialize)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_check(args: RecordsArgs) -> Result<(), AppError> {
    let store = open_store(args)?;
    let path = store.path().display().to_string();

    match store.read() {
        Ok(document) => {
            println!(
                "{path}: ok ({} leave period(s), {} popup(s))",
                document.leave_periods.len(),
                document.popups.len()
            );
            Ok(())
        }
        Err(StoreError::Missing { .. }) => {
            println!("{path}: missing, the site will start from an empty document");
            Ok(())
        }
        Err(err) => {
            println!("{path}: unusable, the site would serve an empty document");
            Err(err.into())
        }
    }
}
