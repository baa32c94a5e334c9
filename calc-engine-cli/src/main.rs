use anyhow::{anyhow, bail, Context, Result};
use calc_engine::interpreter::lexer::tokenize;
use calc_engine::interpreter::{convert, tokens_to_string};
use calc_engine::{Mode, ModeManager, ParserKind};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::debug;

/// Evaluates the given expression
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Arguments {
    /// The expression to evaluate
    expression: Option<String>,

    /// The calculator mode to evaluate in
    #[clap(short, long, default_value = "standard")]
    mode: String,

    /// Number of decimal digits to display
    #[clap(short, long)]
    precision: Option<usize>,

    /// Parser to use: shunting-yard or recursive-descent
    #[clap(long)]
    parser: Option<String>,

    /// Display base of the result (2, 8, 10 or 16)
    #[clap(short, long)]
    base: Option<u32>,

    /// Print the parsed expression tree
    #[clap(long)]
    tree: bool,

    /// Print the normalized token stream
    #[clap(long)]
    tokens: bool,

    /// List the available modes and exit
    #[clap(long)]
    list_modes: bool,

    #[clap(flatten)]
    verbose: Verbosity,
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut manager = ModeManager::new();
    if args.list_modes {
        for name in manager.available_modes() {
            if let Some(mode) = manager.get_mode(&name) {
                println!("{:<12}{}", name, mode.description());
            }
        }
        return Ok(());
    }

    let expression = args
        .expression
        .as_deref()
        .ok_or_else(|| anyhow!("no expression given"))?;
    let mode = select_mode(&mut manager, &args.mode)?;
    configure(mode, &args)?;
    debug!("evaluating {:?} in {} mode", expression, mode.name());

    if args.tokens {
        let tokens = tokenize(expression).context("could not tokenize expression")?;
        println!("{}", tokens_to_string(&tokens)?);
    }
    if args.tree {
        let tree = convert(expression, mode.context().operators(), mode.parser_kind())
            .context("could not parse expression")?;
        print!("{}", tree.to_tree_string());
    }

    let result = mode.evaluate(expression);
    if result.is_error() {
        bail!("{}", result);
    }
    println!("{}", mode.format_value(result.value())?);
    Ok(())
}

fn select_mode<'a>(manager: &'a mut ModeManager, name: &str) -> Result<&'a mut dyn Mode> {
    let available = manager.available_modes();
    manager.get_mode_mut(name).ok_or_else(|| {
        anyhow!(
            "unknown mode '{}', expected one of: {}",
            name,
            available.join(", ")
        )
    })
}

fn configure(mode: &mut dyn Mode, args: &Arguments) -> Result<()> {
    if let Some(precision) = args.precision {
        mode.set_precision(precision);
    }
    if let Some(parser) = &args.parser {
        let kind: ParserKind = parser.parse()?;
        mode.set_parser_kind(kind);
    }
    if let Some(base) = args.base {
        mode.set_display_base(base)
            .with_context(|| format!("cannot display results in base {}", base))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::modes::{ProgrammerMode, StandardMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn known_mode_is_selected_by_name() {
        let mut manager = ModeManager::new();

        let mode = select_mode(&mut manager, "programmer").unwrap();

        assert_eq!(mode.name(), "programmer");
    }

    #[test]
    fn unknown_mode_lists_the_registered_modes() {
        let mut manager = ModeManager::empty();
        manager.register_mode(Box::new(StandardMode::new()));
        manager.register_mode(Box::new(ProgrammerMode::new()));

        let error = select_mode(&mut manager, "graphing").err().unwrap();

        assert_eq!(
            error.to_string(),
            "unknown mode 'graphing', expected one of: programmer, standard"
        );
    }
}
