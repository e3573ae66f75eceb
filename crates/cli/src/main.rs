use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

use vlanwatch_core::config::{Config, NetworkSeed};
use vlanwatch_core::rules::AlertRecord;
use vlanwatch_core::source::{assemble_report_text, FileSource};
use vlanwatch_core::storage::{alert_key, StateStore};
use vlanwatch_core::store::Network;
use vlanwatch_core::table::{usage_table, write_xlsx, TableOptions};
use vlanwatch_core::Ingest;

#[derive(Parser, Debug)]
#[command(
    name = "vlanwatch",
    version,
    about = "Per-VLAN usage tracking with day-over-day alerts"
)]
struct Cli {
    /// Path to a vlanwatch.toml (default: discovered in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// State directory (default: config `data_dir`, then ./vlanwatch-data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a report text and save it as one day's snapshot
    Save {
        #[arg(long)]
        network: String,

        /// Report date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Report text file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Assemble report text from a category feed directory, optionally saving it
    Fetch {
        #[arg(long)]
        network: String,

        /// Feed root containing <network-name>/<color>.txt files
        #[arg(long)]
        source: PathBuf,

        /// Save the assembled text under this date instead of printing it
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the stored alert record for a saved date
    Alerts {
        #[arg(long)]
        network: String,

        #[arg(long)]
        date: String,

        /// Write alerts.json and alerts.md into this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render the usage table (row per VLAN, column per date)
    Table {
        #[arg(long)]
        network: String,

        /// Only VLANs classified under this port label
        #[arg(long)]
        port: Option<String>,

        /// Only VLANs that have reported down on at least one day
        #[arg(long)]
        down_only: bool,

        /// Also write the table as a spreadsheet
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// List VLAN histories for a network
    Vlans {
        #[arg(long)]
        network: String,
    },

    /// List known networks
    Networks,

    /// Delete one day's snapshot
    DeleteDay {
        #[arg(long)]
        network: String,

        #[arg(long)]
        date: String,
    },

    /// Delete a VLAN and all its recorded data
    DeleteVlan {
        #[arg(long)]
        network: String,

        #[arg(long)]
        vlan: u32,
    },

    /// Rename a VLAN's display name
    RenameVlan {
        #[arg(long)]
        network: String,

        #[arg(long)]
        vlan: u32,

        #[arg(long)]
        name: String,
    },

    /// Delete all reports and histories for a network
    Clear {
        #[arg(long)]
        network: String,
    },
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let env = load_env(cli.config.as_deref(), cli.data_dir.as_deref());

    let res = match cli.cmd {
        Commands::Save {
            network,
            date,
            input,
        } => read_input(input.as_deref())
            .and_then(|text| run_save(&env, &network, &date, &text)),
        Commands::Fetch {
            network,
            source,
            date,
        } => run_fetch(&env, &network, &source, date.as_deref()),
        Commands::Alerts { network, date, out } => {
            run_alerts(&env, &network, &date, out.as_deref())
        }
        Commands::Table {
            network,
            port,
            down_only,
            xlsx,
        } => run_table(&env, &network, port, down_only, xlsx.as_deref()),
        Commands::Vlans { network } => run_vlans(&env, &network),
        Commands::Networks => run_networks(&env),
        Commands::DeleteDay { network, date } => run_delete_day(&env, &network, &date),
        Commands::DeleteVlan { network, vlan } => run_delete_vlan(&env, &network, vlan),
        Commands::RenameVlan {
            network,
            vlan,
            name,
        } => run_rename_vlan(&env, &network, vlan, &name),
        Commands::Clear { network } => run_clear(&env, &network),
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            std::process::ExitCode::from(1)
        }
    }
}

struct Env {
    store: StateStore,
    seeds: Vec<NetworkSeed>,
}

fn load_env(config: Option<&Path>, data_dir: Option<&Path>) -> Env {
    let cfg = match config {
        Some(p) => Config::load(p).unwrap_or_else(|e| {
            eprintln!(
                "{}{}warning:{} failed to load config {}: {}",
                style().bold,
                style().yellow,
                style().reset,
                p.display(),
                e
            );
            Config::default()
        }),
        None => Config::discover().unwrap_or_default(),
    };

    let dir = resolve_data_dir(data_dir, cfg.data_dir.as_deref());
    Env {
        store: StateStore::new(dir),
        seeds: cfg.seeds(),
    }
}

fn resolve_data_dir(cli: Option<&Path>, config: Option<&Path>) -> PathBuf {
    cli.or(config)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("vlanwatch-data"))
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("read {}", p.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            Ok(buf)
        }
    }
}

fn print_banner() {
    let s = style();
    eprintln!(
        "\n  {bold}vlan{reset}{yellow}|{reset}{dim}watch{reset}  {dim}per-VLAN usage tracker{reset}\n",
        bold = s.bold,
        yellow = s.yellow,
        dim = s.dim,
        reset = s.reset,
    );
}

fn bucket_color(bucket: &str) -> &'static str {
    let s = style();
    match bucket {
        "urgent" => s.red,
        "warning" => s.yellow,
        _ => s.dim,
    }
}

fn print_alerts(record: &AlertRecord) {
    let s = style();
    eprintln!(
        "  {dim}compared with         {reset}{bold}{}{reset}",
        record.compared_with,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );

    for (bucket, items) in [
        ("urgent", &record.urgent),
        ("warning", &record.warning),
        ("info", &record.info),
    ] {
        let bc = bucket_color(bucket);
        for item in items {
            eprintln!(
                "  {bc}{bucket:<7}{reset} V{} {} {dim}{} {} \u{2192} {} MB ({}%){reset}",
                item.vlan,
                item.kind.as_str(),
                item.name,
                item.from,
                item.to,
                item.percent,
                bc = bc,
                bucket = bucket,
                dim = s.dim,
                reset = s.reset
            );
        }
    }
}

fn load_network(
    networks: &std::collections::BTreeMap<String, Network>,
    id: &str,
) -> anyhow::Result<Network> {
    networks
        .get(id)
        .cloned()
        .with_context(|| format!("unknown network {id:?}"))
}

fn run_save(
    env: &Env,
    network_id: &str,
    date: &str,
    text: &str,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();
    print_banner();

    let now = Utc::now().to_rfc3339();
    let mut networks = env.store.load_networks(&env.seeds, &now)?;
    let network = load_network(&networks, network_id)?;

    let Some(outcome) = vlanwatch_core::ingest(&network, date, text, &now)? else {
        eprintln!(
            "  {yellow}{bold}NOTHING PARSED{reset}  {dim}no VLAN readings found; state untouched{reset}\n",
            yellow = s.yellow,
            bold = s.bold,
            dim = s.dim,
            reset = s.reset,
        );
        return Ok(std::process::ExitCode::from(2));
    };

    persist_outcome(env, &mut networks, network_id, date, &outcome)?;

    let (urgent, warning, info) = outcome
        .alerts
        .as_ref()
        .map_or((0, 0, 0), |a| (a.urgent.len(), a.warning.len(), a.info.len()));

    // Machine-parseable line on stdout
    println!("saved={} urgent={urgent} warning={warning} info={info}", outcome.saved);

    // Human-readable output on stderr
    eprintln!(
        "  {dim}readings saved        {reset}{bold}{}{reset} {dim}({} of {} lines matched){reset}",
        outcome.saved,
        outcome.stats.matched,
        outcome.stats.total_lines,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    if let Some(record) = &outcome.alerts {
        print_alerts(record);
    } else {
        eprintln!(
            "  {dim}no earlier date to compare against{reset}",
            dim = s.dim,
            reset = s.reset
        );
    }
    eprintln!();
    eprintln!(
        "  {green}{bold}SAVED{reset}  {dim}{} @ {}{reset}\n",
        network_id,
        date,
        green = s.green,
        bold = s.bold,
        dim = s.dim,
        reset = s.reset,
    );

    Ok(std::process::ExitCode::SUCCESS)
}

fn persist_outcome(
    env: &Env,
    networks: &mut std::collections::BTreeMap<String, Network>,
    network_id: &str,
    date: &str,
    outcome: &Ingest,
) -> anyhow::Result<()> {
    networks.insert(network_id.to_string(), outcome.network.clone());
    env.store.save_networks(networks)?;

    if let Some(record) = &outcome.alerts {
        let mut history = env.store.load_alert_history()?;
        history.insert(alert_key(network_id, date), record.clone());
        env.store.save_alert_history(&history)?;
    }

    env.store.save_current_network(network_id)?;
    Ok(())
}

fn run_fetch(
    env: &Env,
    network_id: &str,
    source_dir: &Path,
    date: Option<&str>,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();
    let now = Utc::now().to_rfc3339();
    let networks = env.store.load_networks(&env.seeds, &now)?;
    let network = load_network(&networks, network_id)?;

    let source = FileSource::new(source_dir);
    let text = assemble_report_text(&source, &network.name);
    if text.is_empty() {
        eprintln!(
            "  {yellow}{bold}NO DATA{reset}  {dim}no usable report text for {}{reset}",
            network.name,
            yellow = s.yellow,
            bold = s.bold,
            dim = s.dim,
            reset = s.reset,
        );
        return Ok(std::process::ExitCode::from(2));
    }

    match date {
        Some(date) => run_save(env, network_id, date, &text),
        None => {
            println!("{text}");
            Ok(std::process::ExitCode::SUCCESS)
        }
    }
}

fn run_alerts(
    env: &Env,
    network_id: &str,
    date: &str,
    out: Option<&Path>,
) -> anyhow::Result<std::process::ExitCode> {
    let history = env.store.load_alert_history()?;
    let record = history
        .get(&alert_key(network_id, date))
        .with_context(|| format!("no alert record for {network_id} @ {date}"))?;

    println!(
        "urgent={} warning={} info={}",
        record.urgent.len(),
        record.warning.len(),
        record.info.len()
    );
    print_alerts(record);
    eprintln!();

    if let Some(out) = out {
        std::fs::create_dir_all(out)
            .with_context(|| format!("create out dir {}", out.display()))?;

        let json_path = out.join("alerts.json");
        let json = serde_json::to_vec_pretty(record).context("serialize alerts json")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("write {}", json_path.display()))?;

        let md_path = out.join("alerts.md");
        std::fs::write(&md_path, record.to_markdown())
            .with_context(|| format!("write {}", md_path.display()))?;

        let s = style();
        eprintln!(
            "  {dim}\u{2192} {}{reset}",
            json_path.display(),
            dim = s.dim,
            reset = s.reset
        );
        eprintln!(
            "  {dim}\u{2192} {}{reset}\n",
            md_path.display(),
            dim = s.dim,
            reset = s.reset
        );
    }

    Ok(std::process::ExitCode::SUCCESS)
}

fn run_table(
    env: &Env,
    network_id: &str,
    port: Option<String>,
    down_only: bool,
    xlsx: Option<&Path>,
) -> anyhow::Result<std::process::ExitCode> {
    let now = Utc::now().to_rfc3339();
    let networks = env.store.load_networks(&env.seeds, &now)?;
    let network = load_network(&networks, network_id)?;

    let table = usage_table(&network, &TableOptions { port, down_only });
    print!("{}", table.to_markdown());

    if let Some(path) = xlsx {
        write_xlsx(&table, path)?;
        let s = style();
        eprintln!(
            "  {dim}\u{2192} {}{reset}",
            path.display(),
            dim = s.dim,
            reset = s.reset
        );
    }

    Ok(std::process::ExitCode::SUCCESS)
}

fn run_vlans(env: &Env, network_id: &str) -> anyhow::Result<std::process::ExitCode> {
    let now = Utc::now().to_rfc3339();
    let networks = env.store.load_networks(&env.seeds, &now)?;
    let network = load_network(&networks, network_id)?;

    for vlan in network.vlans.values() {
        println!(
            "V{} name={:?} port={} first_seen={} days={}",
            vlan.number,
            vlan.name,
            vlanwatch_core::ports::port_label(&vlan.name),
            vlan.first_seen,
            vlan.days.len()
        );
    }
    Ok(std::process::ExitCode::SUCCESS)
}

fn run_networks(env: &Env) -> anyhow::Result<std::process::ExitCode> {
    let now = Utc::now().to_rfc3339();
    let networks = env.store.load_networks(&env.seeds, &now)?;
    let current = env.store.load_current_network()?;

    for network in networks.values() {
        let marker = if current.as_deref() == Some(network.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {} name={} dates={} vlans={}",
            network.id,
            network.name,
            network.dates.len(),
            network.vlans.len()
        );
    }
    Ok(std::process::ExitCode::SUCCESS)
}

fn mutate_network(
    env: &Env,
    network_id: &str,
    apply: impl FnOnce(&Network, &str) -> Network,
) -> anyhow::Result<()> {
    let now = Utc::now().to_rfc3339();
    let mut networks = env.store.load_networks(&env.seeds, &now)?;
    let network = load_network(&networks, network_id)?;
    networks.insert(network_id.to_string(), apply(&network, &now));
    env.store.save_networks(&networks)
}

fn run_delete_day(
    env: &Env,
    network_id: &str,
    date: &str,
) -> anyhow::Result<std::process::ExitCode> {
    mutate_network(env, network_id, |network, now| network.delete_day(date, now))?;

    let mut history = env.store.load_alert_history()?;
    if history.remove(&alert_key(network_id, date)).is_some() {
        env.store.save_alert_history(&history)?;
    }

    confirm(&format!("deleted day {date} from {network_id}"));
    Ok(std::process::ExitCode::SUCCESS)
}

fn run_delete_vlan(
    env: &Env,
    network_id: &str,
    vlan: u32,
) -> anyhow::Result<std::process::ExitCode> {
    mutate_network(env, network_id, |network, now| network.delete_vlan(vlan, now))?;
    confirm(&format!("deleted V{vlan} from {network_id}"));
    Ok(std::process::ExitCode::SUCCESS)
}

fn run_rename_vlan(
    env: &Env,
    network_id: &str,
    vlan: u32,
    name: &str,
) -> anyhow::Result<std::process::ExitCode> {
    mutate_network(env, network_id, |network, now| {
        network.rename_vlan(vlan, name, now)
    })?;
    confirm(&format!("renamed V{vlan} to {name:?}"));
    Ok(std::process::ExitCode::SUCCESS)
}

fn run_clear(env: &Env, network_id: &str) -> anyhow::Result<std::process::ExitCode> {
    mutate_network(env, network_id, |network, now| network.clear(now))?;
    confirm(&format!("cleared all data for {network_id}"));
    Ok(std::process::ExitCode::SUCCESS)
}

fn confirm(message: &str) {
    let s = style();
    eprintln!(
        "  {green}{bold}OK{reset}  {dim}{message}{reset}",
        green = s.green,
        bold = s.bold,
        dim = s.dim,
        reset = s.reset,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn resolve_data_dir_prefers_cli_then_config() {
        assert_eq!(
            resolve_data_dir(Some(Path::new("cli-dir")), Some(Path::new("cfg-dir"))),
            PathBuf::from("cli-dir")
        );
        assert_eq!(
            resolve_data_dir(None, Some(Path::new("cfg-dir"))),
            PathBuf::from("cfg-dir")
        );
        assert_eq!(resolve_data_dir(None, None), PathBuf::from("vlanwatch-data"));
    }

    #[test]
    fn bucket_colors_map_severities() {
        assert_eq!(bucket_color("urgent"), style().red);
        assert_eq!(bucket_color("warning"), style().yellow);
        assert_eq!(bucket_color("info"), style().dim);
    }

    #[test]
    #[serial]
    fn style_respects_no_color() {
        std::env::set_var("NO_COLOR", "1");
        assert_eq!(style().bold, "");
        std::env::remove_var("NO_COLOR");
        assert_ne!(style().bold, "");
    }
}
