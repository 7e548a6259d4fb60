use super::*;

#[test]
fn parses_simulate_track_with_defaults() {
    let cli = Cli::try_parse_from(["wayward-cli", "simulate", "track"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Simulate {
            command: simulate::SimulateCommands::Track {
                users: 100,
                concurrency: 8,
                ticks: 1,
            }
        }
    ));
}

#[test]
fn parses_simulate_track_overrides() {
    let cli = Cli::try_parse_from([
        "wayward-cli",
        "simulate",
        "track",
        "--users",
        "50",
        "--concurrency",
        "4",
        "--ticks",
        "3",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Simulate {
            command: simulate::SimulateCommands::Track {
                users: 50,
                concurrency: 4,
                ticks: 3,
            }
        }
    ));
}

#[test]
fn parses_simulate_rewards_command() {
    let cli = Cli::try_parse_from(["wayward-cli", "simulate", "rewards", "--users", "25"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Simulate {
            command: simulate::SimulateCommands::Rewards {
                users: 25,
                concurrency: 16,
            }
        }
    ));
}

#[test]
fn parses_catalog_command() {
    let cli = Cli::try_parse_from(["wayward-cli", "catalog"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Catalog));
}

#[test]
fn rejects_unknown_command() {
    assert!(Cli::try_parse_from(["wayward-cli", "teleport"]).is_err());
}
