/// The `clear` subcommand: delete the snapshot so the next run starts cold.
use anyhow::Context;

use readsleuth_core::store::StateStore;

pub fn run(store: &StateStore) -> anyhow::Result<()> {
    store.clear().context("cannot remove snapshot")?;
    println!("Cleared snapshot at {}", store.path().display());
    Ok(())
}
