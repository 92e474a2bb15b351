use anyhow::{Context, bail};
use cli_shell::options::Options;
use cli_shell::{Environment, Interpreter};

fn main() -> anyhow::Result<()> {
    let opts: Options = argh::from_env();

    env_logger::Builder::new()
        .filter_level(opts.log_level())
        .parse_default_env()
        .init();

    let env = match &opts.directory {
        Some(dir) => {
            let dir = std::path::absolute(dir)
                .with_context(|| format!("can't resolve {}", dir.display()))?;
            if !dir.is_dir() {
                bail!("{} is not a directory", dir.display());
            }
            Environment::in_dir(dir)
        }
        None => Environment::new(),
    };
    let mut sh = Interpreter::with_builtins(env);

    if let Some(line) = &opts.command {
        let code = sh.execute(line);
        std::process::exit(code);
    }

    sh.repl(opts.history.as_deref())
}
