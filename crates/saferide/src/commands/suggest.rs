use anyhow::{Context, Result};
use colored::Colorize;
use inquire::InquireError;
use tokio::sync::mpsc::UnboundedReceiver;

use saferide::api::GeocodingClient;
use saferide::autocomplete::{SuggestionDebouncer, SuggestionList, SuggestionSource, SuggestionUpdate};
use saferide::config::Config;

const HELP: &str = "type to search, a number to pick, empty line to quit";

/// Run the suggest command.
///
/// Queries go through the same debouncer a location input uses, so the minimum query
/// length and the delay come from the `autocomplete` config section.
pub fn run(query: &str, limit: Option<usize>, interactive: bool) -> Result<()> {
    let config = Config::load_or_default();
    let mut settings = config.debounce_settings();
    if let Some(limit) = limit {
        settings.limit = limit;
    }
    let min_query_len = settings.min_query_len;
    let client = GeocodingClient::new(config.geocoder_url());
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let (debouncer, updates) = SuggestionDebouncer::new(client, settings);
        let mut session = SuggestSession {
            debouncer,
            updates,
            list: SuggestionList::new(),
            min_query_len,
        };
        session.search(query).await?;
        if interactive {
            session.prompt_loop().await?;
        }
        Ok(())
    })
}

struct SuggestSession<S: SuggestionSource> {
    debouncer: SuggestionDebouncer<S>,
    updates: UnboundedReceiver<SuggestionUpdate>,
    list: SuggestionList,
    min_query_len: usize,
}

impl<S: SuggestionSource> SuggestSession<S> {
    async fn search(&mut self, query: &str) -> Result<()> {
        self.debouncer.input(query);
        let update = self
            .updates
            .recv()
            .await
            .context("Suggestion channel closed")?;
        let cleared = update == SuggestionUpdate::Cleared;
        self.list.apply(update);

        if cleared {
            println!(
                "{}",
                format!(
                    "Type at least {} characters to get suggestions.",
                    self.min_query_len
                )
                .yellow()
            );
        } else if self.list.is_empty() {
            println!("{}", format!("No suggestions for {:?}.", query.trim()).yellow());
        } else {
            print_list(&self.list);
        }
        Ok(())
    }

    async fn prompt_loop(&mut self) -> Result<()> {
        loop {
            let input = match inquire::Text::new("search>").with_help_message(HELP).prompt() {
                Ok(input) => input,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                }
                Err(e) => return Err(e).context("Prompt failed"),
            };
            let input = input.trim();
            if input.is_empty() {
                return Ok(());
            }

            let Ok(number) = input.parse::<usize>() else {
                self.search(input).await?;
                continue;
            };
            match number.checked_sub(1).and_then(|i| self.list.pick(i)) {
                Some(picked) => {
                    println!(
                        "{} {}  {}",
                        picked.glyph(),
                        picked.name.bold(),
                        picked.coord().to_string().green()
                    );
                    return Ok(());
                }
                None => println!("{}", format!("No suggestion {number}").yellow()),
            }
        }
    }
}

fn print_list(list: &SuggestionList) {
    for (i, suggestion) in list.items().iter().enumerate() {
        println!(
            "{:>2}. {} {}  {}",
            i + 1,
            suggestion.glyph(),
            suggestion.name,
            suggestion.coord().to_string().dimmed()
        );
    }
}
