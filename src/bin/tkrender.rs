use anyhow::Result;
use clap::Parser as ClapParser;
use tkruntime::{builtin, config::Config, scope::Scope, trace, warn, warn::set_trace};

#[derive(clap::Parser, Debug)]
/// Render a builtin template with a JSON context and print the
/// result.
struct Args {
    /// Identifier of the template, e.g. "greeting"
    template: String,

    /// The context, a JSON object, e.g. '{"name": "World"}'
    context: String,

    /// Fail on names missing from both context and globals (default:
    /// $TKRENDER_STRICT)
    #[clap(long)]
    strict: bool,

    /// JSON file with the global names (default: $TKRENDER_GLOBALS)
    #[clap(long)]
    globals: Option<std::path::PathBuf>,

    /// Print trace output to stderr (default: $TKRENDER_TRACE)
    #[clap(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    config.strict |= args.strict;
    config.trace |= args.trace;
    if args.globals.is_some() {
        config.globals_path = args.globals;
    }
    set_trace(config.trace);
    trace!("{config:?}");

    let globals = config.load_globals()?;
    let scope = Scope::from_json_str(&args.context, globals)?
        .with_policy(config.policy());
    let registry = builtin::registry()?;
    let template = match registry.load(&args.template) {
        Ok(t) => t,
        Err(e) => {
            warn!("known templates: {}", registry.ids().join(", "));
            return Err(e.into())
        }
    };
    let html = template.bind(scope).render()?;
    println!("{html}");
    Ok(())
}
