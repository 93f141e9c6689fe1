#[cfg(feature = "cli")]
mod cli {
    use clap::Parser;
    use gff2anvio::error::GeneCallError;
    use std::path::PathBuf;

    /// Convert Prodigal gene calls in GFF3 format to an anvi'o external
    /// gene calls table.
    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    pub struct Cli {
        /// Gene call file in GFF3 format. May be gzip-compressed.
        #[arg(value_name = "GFF3")]
        pub gff_file: PathBuf,

        /// Output path for the external gene calls table.
        #[arg(long, value_name = "gene_calls.txt", default_value = "gene_calls.txt")]
        pub gene_calls: PathBuf,

        /// Gene caller that produced the input.
        #[arg(long, value_name = "Prodigal", default_value = "Prodigal")]
        pub source: String,
    }

    pub fn run() -> Result<(), GeneCallError> {
        let cli = Cli::parse();
        let summary =
            gff2anvio::run_conversion(&cli.gff_file, &cli.gene_calls, &cli.source)?;
        summary.print_summary();
        Ok(())
    }
}

fn main() {
    #[cfg(feature = "cli")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();

        if let Err(e) = cli::run() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("CLI feature not enabled. Please rebuild with --features cli");
        std::process::exit(1);
    }
}
