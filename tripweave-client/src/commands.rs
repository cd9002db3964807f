//! Command-line input parsing for the interactive client.

use chrono::NaiveDate;
use tripweave_core::{
    parse_budget, Currency, EntityIdType, ItemRef, ItemType, MapId, ProfileField, RouteId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain text, sent to the conversation.
    Say(String),
    Login { email: String, password: String },
    Register { email: String, password: String },
    Logout,
    Params {
        start_date: NaiveDate,
        end_date: NaiveDate,
        budget: Option<f64>,
        currency: Option<Currency>,
    },
    Finalize(RouteId),
    Edit(RouteId),
    Delete(MapId),
    Replace(MapId),
    Add,
    Search(String),
    /// Zero-based index into the visible results.
    Pick(usize),
    CloseSearch,
    Save,
    Cancel,
    Reviews(ItemRef),
    Review { rating: Option<u8>, comment: String },
    History,
    Route(RouteId),
    Profile,
    /// Blank `value` clears the field.
    SetProfile { field: ProfileField, value: String },
    Recommend,
    /// Zero-based index into the last recommendation list.
    RecommendedReviews(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid {arg}: {reason}")]
    InvalidArgument { arg: &'static str, reason: String },
}

pub const HELP: &str = "\
Type a message to plan a trip. Commands:
  /login <email> <password>      log in
  /register <email> <password>   create an account
  /logout                        log out
  /params <start> <end> [budget] [currency]
                                 set trip dates (YYYY-MM-DD) and budget
  /finalize <route_id>           approve a route
  /edit <route_id>               edit a route
  /delete <map_id>               remove a point (asks for confirmation)
  /replace <map_id>              replace a point via search
  /add                           add a point via search
  /search <text>                 type into the search box
  /pick <n>                      choose the n-th search result
  /close                         close the search box
  /save                          save the edited route
  /cancel                        discard the edit session
  /reviews <location|activity> <id>
                                 show reviews
  /review [rating] [comment]     review the item shown by /reviews
  /history                       list your past queries
  /route <route_id>              show a stored route
  /profile                       show your travel profile
  /profile set <interests|style|budget|currency> [value]
                                 change one profile field (blank clears it)
  /recommend                     list personalized recommendations
  /recommend <n>                 show reviews of the n-th recommendation
  /help                          show this help
  /quit                          exit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Ok(Command::Say(trimmed.to_string()));
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match name {
        "login" => {
            let (email, password) = credentials(&args, "/login <email> <password>")?;
            Ok(Command::Login { email, password })
        }
        "register" => {
            let (email, password) = credentials(&args, "/register <email> <password>")?;
            Ok(Command::Register { email, password })
        }
        "logout" => Ok(Command::Logout),
        "params" => parse_params(&args),
        "finalize" => Ok(Command::Finalize(id_arg(&args, "/finalize <route_id>", "route_id")?)),
        "edit" => Ok(Command::Edit(id_arg(&args, "/edit <route_id>", "route_id")?)),
        "delete" => Ok(Command::Delete(id_arg(&args, "/delete <map_id>", "map_id")?)),
        "replace" => Ok(Command::Replace(id_arg(&args, "/replace <map_id>", "map_id")?)),
        "add" => Ok(Command::Add),
        "search" => Ok(Command::Search(rest.to_string())),
        "pick" => Ok(Command::Pick(ordinal(single(&args, "/pick <n>")?)?)),
        "close" => Ok(Command::CloseSearch),
        "save" => Ok(Command::Save),
        "cancel" => Ok(Command::Cancel),
        "reviews" => {
            const USAGE: &str = "/reviews <location|activity> <id>";
            let [kind, id] = args[..] else {
                return Err(CommandError::Usage(USAGE));
            };
            let item_type: ItemType = kind.parse().map_err(|reason| {
                CommandError::InvalidArgument {
                    arg: "item type",
                    reason,
                }
            })?;
            let id: i64 = id.parse().map_err(|_| CommandError::InvalidArgument {
                arg: "id",
                reason: format!("'{}' is not a number", id),
            })?;
            Ok(Command::Reviews(ItemRef::from_parts(item_type, id)))
        }
        "review" => parse_review(rest),
        "history" => Ok(Command::History),
        "route" => Ok(Command::Route(id_arg(&args, "/route <route_id>", "route_id")?)),
        "profile" => parse_profile(rest),
        "recommend" => match args[..] {
            [] => Ok(Command::Recommend),
            [raw] => Ok(Command::RecommendedReviews(ordinal(raw)?)),
            _ => Err(CommandError::Usage("/recommend [n]")),
        },
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn single<'a>(args: &[&'a str], usage: &'static str) -> Result<&'a str, CommandError> {
    match args {
        [value] => Ok(value),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// One-based list position, returned zero-based.
fn ordinal(raw: &str) -> Result<usize, CommandError> {
    let n: usize = raw.parse().map_err(|_| CommandError::InvalidArgument {
        arg: "n",
        reason: format!("'{}' is not a number", raw),
    })?;
    if n == 0 {
        return Err(CommandError::InvalidArgument {
            arg: "n",
            reason: "results are numbered from 1".to_string(),
        });
    }
    Ok(n - 1)
}

fn credentials(args: &[&str], usage: &'static str) -> Result<(String, String), CommandError> {
    match args {
        [email, password] => Ok((email.to_string(), password.to_string())),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn id_arg<T: EntityIdType>(
    args: &[&str],
    usage: &'static str,
    arg: &'static str,
) -> Result<T, CommandError> {
    let raw = single(args, usage)?;
    let value: i64 = raw.parse().map_err(|_| CommandError::InvalidArgument {
        arg,
        reason: format!("'{}' is not a number", raw),
    })?;
    Ok(T::new(value))
}

fn parse_date(raw: &str, arg: &'static str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| CommandError::InvalidArgument {
        arg,
        reason: e.to_string(),
    })
}

fn parse_params(args: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "/params <start YYYY-MM-DD> <end YYYY-MM-DD> [budget] [currency]";
    if !(2..=4).contains(&args.len()) {
        return Err(CommandError::Usage(USAGE));
    }
    let start_date = parse_date(args[0], "start date")?;
    let end_date = parse_date(args[1], "end date")?;
    let budget = match args.get(2) {
        Some(raw) => parse_budget(raw).map_err(|e| CommandError::InvalidArgument {
            arg: "budget",
            reason: e.to_string(),
        })?,
        None => None,
    };
    let currency = match args.get(3) {
        Some(raw) => Some(raw.parse::<Currency>().map_err(|e| {
            CommandError::InvalidArgument {
                arg: "currency",
                reason: e.to_string(),
            }
        })?),
        None => None,
    };
    Ok(Command::Params {
        start_date,
        end_date,
        budget,
        currency,
    })
}

fn parse_profile(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "/profile [set <interests|style|budget|currency> [value]]";
    if rest.is_empty() {
        return Ok(Command::Profile);
    }
    let Some(assignment) = rest.strip_prefix("set") else {
        return Err(CommandError::Usage(USAGE));
    };
    let assignment = assignment.trim();
    let (field, value) = match assignment.split_once(char::is_whitespace) {
        Some((field, value)) => (field, value.trim()),
        None => (assignment, ""),
    };
    if field.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }
    let field: ProfileField = field
        .parse()
        .map_err(|reason| CommandError::InvalidArgument { arg: "field", reason })?;
    Ok(Command::SetProfile {
        field,
        value: value.to_string(),
    })
}

fn parse_review(rest: &str) -> Result<Command, CommandError> {
    let (first, tail) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => (first, tail.trim()),
        None => (rest, ""),
    };
    match first.parse::<u8>() {
        Ok(rating) => Ok(Command::Review {
            rating: Some(rating),
            comment: tail.to_string(),
        }),
        Err(_) => Ok(Command::Review {
            rating: None,
            comment: rest.to_string(),
        }),
    }
}
