use clap::Parser;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    let cli = h5audit::Cli::parse();
    if let Err(err) = start(&cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn start(cli: &h5audit::Cli) -> anyhow::Result<()> {
    let config = h5audit::load_config(cli.config.as_deref())?;
    h5audit::init_logging(&config.log.filter)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    h5audit::run(cli, &config, &mut out)
}
