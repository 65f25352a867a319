use chrono::Utc;
use clap::{Parser, Subcommand};
use payroll::{
    config::PayrollConfig,
    domain::{AccrualPreview, Reading, StreamState, TaxPreview, TokenAmount, YieldPreview},
    logging::init_logging,
    port::{EmployeeApi, WalletConnector},
    service::{LedgerSummary, boot, mock::generator, read_ledger},
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "payroll", version, about = "Streaming payroll client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preview claimable and monthly amounts for a stream snapshot
    Accrual {
        /// Rate in tokens per second
        #[arg(long)]
        rate: String,

        /// Balance already accrued, in tokens
        #[arg(long, default_value = "0")]
        accrued: String,

        /// Unix time of the last withdrawal
        #[arg(long)]
        last_withdraw: u64,

        /// Unix time to evaluate at (defaults to now)
        #[arg(long)]
        now: Option<i64>,

        #[arg(long)]
        inactive: bool,
    },

    /// Estimate tax and net pay at the flat preview rate
    TaxPreview {
        /// Gross amount
        amount: Option<String>,
    },

    /// Estimate a simple-interest return and its tax at the flat preview rate
    YieldPreview {
        /// Amount invested
        #[arg(long)]
        principal: Option<String>,

        /// Annual yield in percent
        #[arg(long)]
        apy: Option<String>,

        /// Holding period in months
        #[arg(long)]
        months: Option<String>,
    },

    /// Fetch and print the employee dashboard
    Dashboard {
        #[arg(long, env = "PAYROLL_EMAIL")]
        email: Option<String>,

        #[arg(long, env = "PAYROLL_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Connect the node-managed wallet before reading
        #[arg(long)]
        wallet: bool,
    },

    /// Withdraw everything claimable to the connected wallet
    Withdraw {
        #[arg(long, env = "PAYROLL_EMAIL")]
        email: Option<String>,

        #[arg(long, env = "PAYROLL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Ledger export utilities
    Ledger {
        #[command(subcommand)]
        command: LedgerCommands,
    },
}

#[derive(Subcommand, Debug)]
enum LedgerCommands {
    /// Generate a demo ledger CSV
    Generate {
        #[arg(short, long, default_value = "ledger.csv", value_name = "FILE")]
        output: PathBuf,

        #[arg(short, long, default_value = "60", value_name = "COUNT")]
        count: usize,
    },

    /// Summarize a ledger CSV by month
    Summary {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let config = PayrollConfig::load(args.config.as_deref())?;
    init_logging(&config.logging, args.verbose).map_err(|e| e.to_string())?;
    if let Some(path) = &args.config {
        tracing::info!("Loaded configuration from {}", path.display());
    }

    let places = config.display.decimals;
    let ticker = config.chain.ticker.clone();

    match args.command {
        Commands::Accrual {
            rate,
            accrued,
            last_withdraw,
            now,
            inactive,
        } => {
            let stream = StreamState {
                rate_per_second: TokenAmount::parse_tokens(&rate)?.wei(),
                last_withdraw_time: last_withdraw,
                accrued_balance: TokenAmount::parse_tokens(&accrued)?.wei(),
                is_active: !inactive,
            };
            let now = now.unwrap_or_else(|| Utc::now().timestamp());
            let preview = AccrualPreview::compute(Reading::Known(stream), Reading::Unknown, now);
            println!("Claimable: {}", preview.claimable_label(places, &ticker));
            println!("Monthly:   {}", preview.monthly_label(places, &ticker));
        }

        Commands::TaxPreview { amount } => {
            let preview = TaxPreview::from_input(amount.as_deref(), config.tax.preview_rate);
            println!("Gross: {}", preview.gross);
            println!("Tax:   {}", preview.tax);
            println!("Net:   {}", preview.net);
            println!("{}", preview.disclaimer());
        }

        Commands::YieldPreview {
            principal,
            apy,
            months,
        } => {
            let preview = YieldPreview::from_input(
                principal.as_deref(),
                apy.as_deref(),
                months.as_deref(),
                config.tax.preview_rate,
            );
            println!("Gross return: {}", preview.gross());
            println!("Tax:          {}", preview.tax.tax);
            println!("Net return:   {}", preview.net());
            println!("{}", preview.tax.disclaimer());
        }

        Commands::Dashboard {
            email,
            password,
            wallet,
        } => {
            let context = boot(config)?;
            if let (Some(email), Some(password)) = (email, password) {
                context.api.login(&email, &password).await?;
            }
            let handle = if wallet {
                Some(context.wallet_connector().connect().await?)
            } else {
                None
            };

            let dashboard = context.dashboard()?;
            let snapshot = dashboard.refresh(handle.as_ref()).await?;

            println!("Signed in as {}", snapshot.profile.email);
            println!("This month: {}", snapshot.monthly_income);
            for (label, value) in snapshot.reconciliation.render(places, &ticker) {
                println!("{label}: {value}");
            }
            println!("Monthly rate: {}", snapshot.accrual.monthly_label(places, &ticker));
            println!("Recent activity:");
            for activity in &snapshot.recent_activity {
                println!("  {} {} ({})", activity.title, activity.amount, activity.time);
            }
        }

        Commands::Withdraw { email, password } => {
            let context = boot(config)?;
            if let (Some(email), Some(password)) = (email, password) {
                context.api.login(&email, &password).await?;
            }
            let connector = context.wallet_connector();
            let handle = connector.connect().await?;

            let dashboard = context.dashboard()?;
            let snapshot = dashboard.refresh(Some(&handle)).await?;
            let receipt = dashboard.withdraw(&snapshot, &handle).await;
            connector.disconnect(&handle).await?;

            let receipt = receipt?;
            let after = snapshot.with_claimable(receipt.claimable);
            println!("Withdrawal mined: {}", receipt.tx_hash);
            println!("Claimable now: {}", after.accrual.claimable_label(places, &ticker));
        }

        Commands::Ledger { command } => match command {
            LedgerCommands::Generate { output, count } => {
                generator(&output, count)?;
            }
            LedgerCommands::Summary { file } => {
                let transactions = read_ledger(&file)?;
                let summary = LedgerSummary::compute(&transactions, Utc::now());
                println!(
                    "{} rows, net {} tax {}, this month {}",
                    summary.count, summary.total_net, summary.total_tax, summary.this_month
                );
                summary.output_csv(std::io::stdout())?;
            }
        },
    }

    Ok(())
}
