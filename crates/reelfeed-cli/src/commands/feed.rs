use clap::Subcommand;
use reelfeed_core::default_catalog;

#[derive(Subcommand)]
pub enum FeedAction {
    /// Print every reel as JSON
    List,
    /// Print one reel as JSON
    Show {
        /// Zero-based position in the feed
        index: usize,
    },
}

pub fn run(action: FeedAction) -> Result<(), Box<dyn std::error::Error>> {
    let items = default_catalog();
    match action {
        FeedAction::List => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        FeedAction::Show { index } => {
            let item = items
                .get(index)
                .ok_or_else(|| format!("no reel at index {index} (feed has {})", items.len()))?;
            println!("{}", serde_json::to_string_pretty(item)?);
        }
    }
    Ok(())
}
