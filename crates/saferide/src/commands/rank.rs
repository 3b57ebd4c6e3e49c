use anyhow::{Context, Result};
use colored::Colorize;
use inquire::InquireError;
use tracing::debug;

use saferide::api::{GeocodingClient, RankRequest, RoutingClient, TravelMode};
use saferide::config::Config;
use saferide::coordinator::surface::MapSurface;
use saferide::coordinator::{ApplyOutcome, InteractionCoordinator, PointerEvent};
use saferide::geometry::Coord;

use crate::terminal::TerminalSurface;

const HELP: &str = "hover N, leave, select N, all, quit";

pub struct RankArgs {
    pub from: String,
    pub to: String,
    pub mode: Option<TravelMode>,
    pub buffer_m: Option<f64>,
    pub max_alternatives: Option<u32>,
    pub fixture: bool,
    pub interactive: bool,
    pub quiet: bool,
}

/// Run the rank command.
pub fn run(args: RankArgs) -> Result<()> {
    if let Some(buffer) = args.buffer_m.filter(|b| !(b.is_finite() && *b >= 0.0)) {
        anyhow::bail!("Invalid --buffer-m: {buffer}. Must be a number of meters >= 0.");
    }

    let config = Config::load_or_default();
    let geocoder = GeocodingClient::new(config.geocoder_url());
    let routing = RoutingClient::new(config.api_url());
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let (start, end) = runtime.block_on(resolve_endpoints(&geocoder, &args.from, &args.to))?;

    let mut request = RankRequest::new(start, end);
    request.mode = args.mode.unwrap_or_else(|| config.mode());
    request.buffer_m = args.buffer_m.unwrap_or_else(|| config.buffer_m());
    request.max_alternatives = args
        .max_alternatives
        .unwrap_or_else(|| config.max_alternatives());
    request.use_fixture = args.fixture;

    let mut coordinator = InteractionCoordinator::new(TerminalSurface::stdout(args.quiet));
    let ticket = coordinator.begin_request(&request);
    let result = runtime
        .block_on(tokio::task::spawn_blocking({
            let request = request.clone();
            move || routing.rank(&request)
        }))
        .context("Routing task failed")?;

    let failure = result.as_ref().err().cloned();
    if coordinator.apply_response(ticket, result) == ApplyOutcome::Failed {
        let err = failure.map(anyhow::Error::new).unwrap_or_else(|| {
            anyhow::anyhow!("No routes found between these points")
        });
        return Err(err.context("Could not rank routes"));
    }

    if args.interactive {
        explore(&mut coordinator)?;
    }
    Ok(())
}

async fn resolve_endpoints(
    geocoder: &GeocodingClient,
    from: &str,
    to: &str,
) -> Result<(Coord, Coord)> {
    let start = spawn_resolve(geocoder.clone(), from.to_string());
    let end = spawn_resolve(geocoder.clone(), to.to_string());
    let (start, end) = tokio::try_join!(start, end).context("Geocoding task failed")?;
    let start = start.with_context(|| format!("Could not locate start {from:?}"))?;
    let end = end.with_context(|| format!("Could not locate destination {to:?}"))?;
    Ok((start, end))
}

fn spawn_resolve(
    geocoder: GeocodingClient,
    text: String,
) -> tokio::task::JoinHandle<saferide::error::Result<Coord>> {
    tokio::task::spawn_blocking(move || resolve_location(&geocoder, &text))
}

/// `lon,lat` text is used as is; anything else goes through the geocoder.
fn resolve_location(geocoder: &GeocodingClient, text: &str) -> saferide::error::Result<Coord> {
    if let Some(coord) = Coord::parse_lon_lat(text) {
        debug!(%coord, "using literal coordinate");
        return Ok(coord);
    }
    geocoder.geocode(text)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Pointer(PointerEvent),
    Quit,
}

/// Parse one prompt line. Route numbers are 1-based, as shown on the cards.
fn parse_action(input: &str) -> Result<Action, String> {
    let mut words = input.split_whitespace();
    let command = words.next().unwrap_or_default().to_ascii_lowercase();
    let route = |arg: Option<&str>| -> Result<usize, String> {
        let arg = arg.ok_or_else(|| format!("'{command}' needs a route number"))?;
        match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("Not a route number: {arg}")),
        }
    };

    let action = match command.as_str() {
        "hover" | "h" => Action::Pointer(PointerEvent::CardHover(route(words.next())?)),
        "leave" | "l" => Action::Pointer(PointerEvent::CardHoverEnd),
        "select" | "s" => Action::Pointer(PointerEvent::CardClick(route(words.next())?)),
        "all" | "a" => Action::Pointer(PointerEvent::AllRoutesClick),
        "quit" | "q" | "exit" => Action::Quit,
        "" => return Err(format!("Commands: {HELP}")),
        other => return Err(format!("Unknown command '{other}'. Commands: {HELP}")),
    };
    Ok(action)
}

fn explore<S: MapSurface>(coordinator: &mut InteractionCoordinator<S>) -> Result<()> {
    loop {
        let input = match inquire::Text::new("route>").with_help_message(HELP).prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(e) => return Err(e).context("Prompt failed"),
        };

        match parse_action(&input) {
            Ok(Action::Quit) => return Ok(()),
            Ok(Action::Pointer(event)) => {
                let index = match event {
                    PointerEvent::CardHover(i) | PointerEvent::CardClick(i) => Some(i),
                    _ => None,
                };
                let known = coordinator
                    .classification()
                    .is_some_and(|c| index.is_none_or(|i| c.contains(i)));
                if !known {
                    println!("{}", format!("No route {}", index.unwrap_or(0) + 1).yellow());
                    continue;
                }
                coordinator.handle(event);
            }
            Err(msg) => println!("{}", msg.yellow()),
        }
    }
}
