//! Console commands and text rendering.
//!
//! Parses one line of player input into a [`Command`] and renders farm
//! snapshots and notifications as plain text.

use core::str::FromStr;

use saverville_types::{FarmSnapshot, Mode, Notification, NotificationLevel, PlotState};

/// Plots per rendered grid row.
pub const GRID_COLUMNS: usize = 10;

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  buy <quantity>                 buy seeds from the ledger
  plant <plot>                   plant a seed
  water <plot>                   water a seeded plot
  harvest <plot>                 harvest a growing or mature plot
  sell                           sell every harvested plant
  mode <plant|water|harvest>     select what a click does
  click <plot>                   act on a plot with the current mode
  show                           draw the farm
  json                           print the farm snapshot as JSON
  help                           print this message
  quit                           leave the farm";

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Buy seeds.
    Buy(u32),
    /// Plant a plot.
    Plant(u32),
    /// Water a plot.
    Water(u32),
    /// Harvest a plot.
    Harvest(u32),
    /// Sell all harvested plants.
    Sell,
    /// Select the click mode.
    Mode(Mode),
    /// Act on a plot with the current mode.
    Click(u32),
    /// Draw the farm.
    Show,
    /// Print the snapshot as JSON.
    Json,
    /// Print the command list.
    Help,
    /// Leave.
    Quit,
}

/// Input that is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// Unrecognized command word.
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    /// A required argument is missing.
    #[error("`{command}` needs a {argument}")]
    MissingArgument {
        /// The command word.
        command: &'static str,
        /// What was expected.
        argument: &'static str,
    },

    /// A numeric argument did not parse.
    #[error("`{0}` is not a non-negative number")]
    InvalidNumber(String),

    /// The mode argument did not parse.
    #[error("{0}")]
    InvalidMode(String),

    /// Extra words after the command.
    #[error("unexpected argument `{0}`")]
    TrailingArgument(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(CommandError::Empty);
        };
        let argument = words.next();
        if let Some(extra) = words.next() {
            return Err(CommandError::TrailingArgument(extra.to_owned()));
        }

        let command = match word.to_ascii_lowercase().as_str() {
            "buy" => Self::Buy(number("buy", "quantity", argument)?),
            "plant" => Self::Plant(number("plant", "plot index", argument)?),
            "water" => Self::Water(number("water", "plot index", argument)?),
            "harvest" => Self::Harvest(number("harvest", "plot index", argument)?),
            "click" => Self::Click(number("click", "plot index", argument)?),
            "mode" => {
                let name = argument.ok_or(CommandError::MissingArgument {
                    command: "mode",
                    argument: "mode name",
                })?;
                Self::Mode(name.parse().map_err(CommandError::InvalidMode)?)
            }
            "sell" => no_argument(Self::Sell, argument)?,
            "show" => no_argument(Self::Show, argument)?,
            "json" => no_argument(Self::Json, argument)?,
            "help" | "?" => no_argument(Self::Help, argument)?,
            "quit" | "exit" => no_argument(Self::Quit, argument)?,
            other => return Err(CommandError::Unknown(other.to_owned())),
        };
        Ok(command)
    }
}

fn number(
    command: &'static str,
    argument: &'static str,
    word: Option<&str>,
) -> Result<u32, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument { command, argument })?;
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_owned()))
}

fn no_argument(command: Command, word: Option<&str>) -> Result<Command, CommandError> {
    match word {
        Some(extra) => Err(CommandError::TrailingArgument(extra.to_owned())),
        None => Ok(command),
    }
}

/// One-character glyph for a plot state.
pub const fn glyph(state: PlotState) -> char {
    match state {
        PlotState::Empty => '.',
        PlotState::Seeded => 's',
        PlotState::Germinating => 'g',
        PlotState::Seedling => 'i',
        PlotState::Growing => 'Y',
        PlotState::Mature => '*',
    }
}

/// Render the farm: a status line, then the grid in rows of
/// [`GRID_COLUMNS`] plots, each row prefixed with its first index.
pub fn render_farm(snapshot: &FarmSnapshot) -> String {
    let economy = &snapshot.economy;
    let mut lines = vec![format!(
        "seeds: {} | plants: {} | balance: ${} | mode: {}",
        economy.seed_inventory, economy.harvested_inventory, economy.currency_balance, snapshot.mode
    )];
    for row in snapshot.plots.chunks(GRID_COLUMNS) {
        let start = row.first().map_or(0, |plot| plot.index);
        let cells: String = row
            .iter()
            .flat_map(|plot| [' ', glyph(plot.state)])
            .collect();
        lines.push(format!("{start:>4} |{cells}"));
    }
    lines.push("legend: . empty  s seeded  g germinating  i seedling  Y growing  * mature".to_owned());
    lines.join("\n")
}

/// Render a notification as one or two lines.
pub fn render_notification(note: &Notification) -> String {
    let marker = match note.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "!!",
    };
    match &note.description {
        Some(description) => format!("[{marker}] {}\n     {description}", note.title),
        None => format!("[{marker}] {}", note.title),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use saverville_types::{EconomyView, PlotView};

    use super::*;

    #[test]
    fn parses_plot_and_economy_commands() {
        assert_eq!("buy 3".parse::<Command>(), Ok(Command::Buy(3)));
        assert_eq!("  Plant 42 ".parse::<Command>(), Ok(Command::Plant(42)));
        assert_eq!("water 0".parse::<Command>(), Ok(Command::Water(0)));
        assert_eq!("harvest 99".parse::<Command>(), Ok(Command::Harvest(99)));
        assert_eq!("click 7".parse::<Command>(), Ok(Command::Click(7)));
        assert_eq!("sell".parse::<Command>(), Ok(Command::Sell));
        assert_eq!("mode water".parse::<Command>(), Ok(Command::Mode(Mode::Watering)));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "dig 3".parse::<Command>(),
            Err(CommandError::Unknown("dig".to_owned()))
        );
        assert_eq!(
            "plant".parse::<Command>(),
            Err(CommandError::MissingArgument {
                command: "plant",
                argument: "plot index",
            })
        );
        assert_eq!(
            "buy -1".parse::<Command>(),
            Err(CommandError::InvalidNumber("-1".to_owned()))
        );
        assert_eq!(
            "sell now".parse::<Command>(),
            Err(CommandError::TrailingArgument("now".to_owned()))
        );
        assert!(matches!(
            "mode dig".parse::<Command>(),
            Err(CommandError::InvalidMode(_))
        ));
    }

    #[test]
    fn renders_rows_of_ten() {
        let plots = (0..25)
            .map(|index| PlotView {
                index,
                state: if index == 12 {
                    PlotState::Mature
                } else {
                    PlotState::Empty
                },
                instance_id: None,
                harvest_at: None,
            })
            .collect();
        let snapshot = FarmSnapshot {
            plots,
            economy: EconomyView {
                seed_inventory: 2,
                harvested_inventory: 1,
                currency_balance: Decimal::new(20, 0),
            },
            mode: Mode::Harvesting,
        };
        let text = render_farm(&snapshot);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines.first().copied(),
            Some("seeds: 2 | plants: 1 | balance: $20 | mode: harvesting")
        );
        assert_eq!(lines.get(1).copied(), Some("   0 | . . . . . . . . . ."));
        assert_eq!(lines.get(2).copied(), Some("  10 | . . * . . . . . . ."));
        assert_eq!(lines.get(3).copied(), Some("  20 | . . . . ."));
    }

    #[test]
    fn notification_without_description_is_one_line() {
        let note = Notification {
            level: NotificationLevel::Error,
            title: "No plants to sell!".to_owned(),
            description: None,
        };
        assert_eq!(render_notification(&note), "[!!] No plants to sell!");
    }
}
