use std::path::Path;

use mazeforge::{Builder, FactoryConfig, MazeError, MazeFactory, Order};

const USAGE: &str =
    "usage: mazeforge <skill> [dfs|prim|boruvka] [perfect|imperfect] [seed] [--config <file>]";

/// What to build, as given on the command line.
#[derive(Debug, PartialEq, Eq)]
struct Request {
    skill: u8,
    builder: Builder,
    perfect: bool,
    seed: Option<u64>,
}

/// Parses the positional arguments. The error is a message for the user.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Request, String> {
    let mut args = args.into_iter();
    let skill = match args.next() {
        Some(s) => match s.parse::<u8>() {
            Ok(skill) => skill,
            Err(_) => return Err(format!("Invalid skill level '{s}'.")),
        },
        None => return Err("Missing skill level.".to_string()),
    };
    let builder = match args.next() {
        Some(s) => s.parse::<Builder>().map_err(|e| e.to_string())?,
        None => Builder::Dfs,
    };
    let perfect = match args.next().as_deref() {
        None | Some("perfect") => true,
        Some("imperfect") => false,
        Some(other) => return Err(format!("Unknown maze kind '{other}'.")),
    };
    let seed = match args.next() {
        Some(s) => match s.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => return Err(format!("Invalid seed '{s}'.")),
        },
        None => None,
    };
    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument '{extra}'."));
    }
    Ok(Request {
        skill,
        builder,
        perfect,
        seed,
    })
}

fn main() -> mazeforge::Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mazeforge=info")),
        )
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .cloned()
                .ok_or_else(|| MazeError::Config("--config needs a file".to_string()))?;
            args.drain(i..=i + 1);
            tracing::info!("Loading configuration from {}", path);
            FactoryConfig::load(Path::new(&path))?
        }
        None if Path::new("mazeforge.toml").exists() => {
            tracing::info!("Loading configuration from mazeforge.toml");
            FactoryConfig::load(Path::new("mazeforge.toml"))?
        }
        None => FactoryConfig::default(),
    };

    let request = match parse_args(args) {
        Ok(request) => request,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return Ok(());
        }
    };

    let factory = MazeFactory::new(config);
    let order = Order::new(
        request.skill,
        request.builder,
        request.perfect,
        request.seed,
    );
    factory.order(&order)?;
    let maze = factory.wait_till_delivered(&order)?;

    println!("{maze}");
    println!("Builder: {}", maze.builder());
    println!("Seed: {}", maze.seed());
    println!("Exit: {}", maze.exit_position());
    println!(
        "Start: {} ({} steps from the exit)",
        maze.start_position(),
        maze.distances().max_distance()
    );
    if !maze.floorplan().rooms().is_empty() {
        println!("Rooms: {}", maze.floorplan().rooms().len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Request, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(
            parse(&["3"]),
            Ok(Request {
                skill: 3,
                builder: Builder::Dfs,
                perfect: true,
                seed: None,
            })
        );
        assert_eq!(
            parse(&["7", "boruvka", "imperfect", "42"]),
            Ok(Request {
                skill: 7,
                builder: Builder::Boruvka,
                perfect: false,
                seed: Some(42),
            })
        );
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["many"]).is_err());
        assert!(parse(&["1", "kruskal"]).is_err());
        assert!(parse(&["1", "prim", "sometimes"]).is_err());
        assert_eq!(
            parse(&["1", "prim", "perfect", "abc"]),
            Err("Invalid seed 'abc'.".to_string())
        );
        assert!(parse(&["1", "prim", "perfect", "5", "extra"]).is_err());
    }
}
