use crate::application::{CalendarApp, CalendarView, Config, init_logging, local_today};
use crate::domain::{DateKey, parse_date_arg};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scopecal")]
#[command(about = "A terminal calendar that folds between month and week views")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive calendar (default)
    Tui {
        /// Date to select on start (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Print a month grid with event markers
    Month {
        /// Any day of the month to print (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Print the first event date on or after a day
    Next {
        /// Day to search from (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        from: Option<String>,
    },
}

impl Cli {
    pub fn run() -> anyhow::Result<()> {
        let cli = Self::parse();
        let config = Config::from_env()?;
        init_logging(&config.log_file)?;

        let today = local_today();
        let today_key = DateKey::from(today);
        let mut app = CalendarApp::new(config, today)?;

        match cli.command {
            Some(Commands::Month { date }) => {
                let target = parse_date_arg(date.as_deref(), today_key)?;
                app.activate(today);
                app.show_month(target);
                app.load_events_blocking();
                print!("{}", app.render_page_text());
            }
            Some(Commands::Next { from }) => {
                let from = parse_date_arg(from.as_deref(), today_key)?;
                app.activate(today);
                app.load_events_blocking();
                match app.next_event(from) {
                    Some(date) => {
                        println!("{}", date);
                        for event in app.events_on(date)? {
                            if !event.title.is_empty() {
                                println!("  {}", event.title);
                            }
                        }
                    }
                    None => println!("No events on or after {}", from),
                }
            }
            Some(Commands::Tui { date }) => {
                let target = parse_date_arg(date.as_deref(), today_key)?;
                CalendarView::new(&mut app, today_key, target)?.run()?;
            }
            None => {
                CalendarView::new(&mut app, today_key, today_key)?.run()?;
            }
        }

        Ok(())
    }
}
