use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;

use product_radar::{
    app_config::AppConfig,
    domain::{
        analyze_products, score_breakdown, signal_for, AnalysisOptions, AnalysisReport,
        BlendMode, ProductCandidate, ProductSort, ReportView,
    },
    infra::{ConfigStore, ReportCache},
    util::{logging::init_tracing, version::Banner},
};

const USAGE: &str = "\
usage: product-radar <command>

commands:
  init-config                 write default configuration files if missing
  show-config                 print the stored configuration
  analyze <candidates.json>   score, rank and cache a list of listings
      --keyword <text>        label the report
      --sort <key>            recommended | score | viability | roi | profit | orders
      --asc                   ascending order
      --only-viable           drop non-viable products
      --min-score <n>         drop products below the final score
      --max-price <amount>    drop products above this supplier price
      --min-roi <percent>     drop products below this ROI
      --max-shipping-days <n> drop products shipping slower than this
      --limit <n>             keep the first n products
      --score-only            do not blend the viability score into the final score
  explain <candidates.json>   print the score components of each listing
  latest                      print the cached latest report (unfiltered)
  version                     print the version";

#[derive(Debug, Default)]
struct AnalyzeArgs {
    input: String,
    keyword: Option<String>,
    view: ReportView,
    score_only: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let app = AppConfig::from_env();
    init_tracing(app.log_json);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    match command.as_str() {
        "init-config" => init_config(&app),
        "show-config" => show_config(&app),
        "analyze" => analyze(&app, parse_analyze_args(rest)?),
        "explain" => {
            let input = rest.first().ok_or_else(|| anyhow!("explain needs an input file"))?;
            explain(&app, input)
        }
        "latest" => latest(&app),
        "version" | "--version" | "-V" => {
            println!("{Banner}");
            Ok(())
        }
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    }
}

fn parse_analyze_args(args: &[String]) -> Result<AnalyzeArgs> {
    let mut parsed = AnalyzeArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--keyword" => parsed.keyword = Some(value_of(&mut iter, arg)?.to_string()),
            "--sort" => {
                let key = value_of(&mut iter, arg)?;
                parsed.view.sort =
                    ProductSort::from_key(key).ok_or_else(|| anyhow!("unknown sort key `{key}`"))?;
            }
            "--asc" => parsed.view.ascending = true,
            "--only-viable" => parsed.view.filter.only_viable = true,
            "--min-score" => {
                parsed.view.filter.min_score = Some(
                    value_of(&mut iter, arg)?
                        .parse()
                        .context("--min-score expects a number between 0 and 100")?,
                );
            }
            "--max-price" => {
                parsed.view.filter.max_supplier_price =
                    Some(number_of(&mut iter, arg, "--max-price expects an amount")?);
            }
            "--min-roi" => {
                parsed.view.filter.min_roi_percent =
                    Some(number_of(&mut iter, arg, "--min-roi expects a percentage")?);
            }
            "--max-shipping-days" => {
                parsed.view.filter.max_shipping_days = Some(
                    value_of(&mut iter, arg)?
                        .parse()
                        .context("--max-shipping-days expects a number of days")?,
                );
            }
            "--limit" => {
                parsed.view.limit = Some(
                    value_of(&mut iter, arg)?
                        .parse()
                        .context("--limit expects a positive number")?,
                );
            }
            "--score-only" => parsed.score_only = true,
            flag if flag.starts_with("--") => bail!("unknown option `{flag}`"),
            input if parsed.input.is_empty() => parsed.input = input.to_string(),
            extra => bail!("unexpected argument `{extra}`"),
        }
    }

    if parsed.input.is_empty() {
        bail!("analyze needs an input file");
    }
    Ok(parsed)
}

fn value_of<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} needs a value"))
}

fn number_of<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
    hint: &'static str,
) -> Result<f64> {
    let value: f64 = value_of(iter, flag)?.parse().context(hint)?;
    if !value.is_finite() {
        bail!(hint);
    }
    Ok(value)
}

fn config_store(app: &AppConfig) -> Result<ConfigStore> {
    app.config_store()
        .ok_or_else(|| anyhow!("no configuration directory; set RADAR_CONFIG_DIR"))
}

fn report_cache(app: &AppConfig) -> Result<ReportCache> {
    app.report_cache()
        .ok_or_else(|| anyhow!("no data directory; set RADAR_DATA_DIR"))
}

fn init_config(app: &AppConfig) -> Result<()> {
    let store = config_store(app)?;
    let outcome = store.seed_defaults()?;
    for (name, created) in [
        ("score", outcome.score_created),
        ("marketplace", outcome.marketplace_created),
    ] {
        let state = if created { "created" } else { "kept existing" };
        println!("{name} configuration: {state}");
    }
    println!("directory: {}", store.dir().display());
    Ok(())
}

fn show_config(app: &AppConfig) -> Result<()> {
    #[derive(Serialize)]
    struct Snapshot {
        score: product_radar::domain::ScoreConfig,
        marketplace: product_radar::domain::MarketplaceConfig,
    }

    let store = config_store(app)?;
    let snapshot = Snapshot {
        score: store.load_score_config()?,
        marketplace: store.load_marketplace_config()?,
    };
    print_json(&snapshot)
}

fn read_candidates(path: &str) -> Result<Vec<ProductCandidate>> {
    let data = fs::read_to_string(Path::new(path))
        .with_context(|| format!("failed to read candidates from {path}"))?;
    serde_json::from_str(&data).with_context(|| format!("{path} is not a list of candidates"))
}

fn analyze(app: &AppConfig, args: AnalyzeArgs) -> Result<()> {
    let store = config_store(app)?;
    let score_config = store.load_score_config()?;
    let marketplace = store.load_marketplace_config()?;
    let candidates = read_candidates(&args.input)?;

    let options = AnalysisOptions {
        keyword: args.keyword.clone(),
        markup: app.markup,
        blend: if args.score_only {
            BlendMode::ScoreOnly
        } else {
            BlendMode::AverageWithViability
        },
        ..AnalysisOptions::default()
    };

    let report = analyze_products(&candidates, &score_config, &marketplace, &options)?;

    // The cache keeps the full analysis; filters only shape what is printed.
    match report_cache(app) {
        Ok(cache) => {
            if let Err(err) = cache.save(&report) {
                tracing::warn!("failed to cache report: {err}");
            }
        }
        Err(err) => tracing::warn!("{err}"),
    }

    let shown = AnalysisReport {
        products: args.view.select(&report.products),
        ..report
    };
    tracing::info!(
        sort = args.view.sort.label(),
        shown = shown.products.len(),
        "report ready"
    );

    print_json(&shown)
}

fn explain(app: &AppConfig, input: &str) -> Result<()> {
    #[derive(Serialize)]
    struct Explained<'a> {
        external_id: &'a str,
        breakdown: product_radar::domain::ScoreBreakdown,
    }

    let store = config_store(app)?;
    let score_config = store.load_score_config()?;
    let candidates = read_candidates(input)?;

    let explained = candidates
        .iter()
        .map(|candidate| {
            let signal = signal_for(candidate, app.markup);
            score_breakdown(&signal, &score_config).map(|breakdown| Explained {
                external_id: &candidate.external_id,
                breakdown,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    print_json(&explained)
}

fn latest(app: &AppConfig) -> Result<()> {
    let cache = report_cache(app)?;
    match cache.load_latest()? {
        Some(cached) => {
            tracing::info!(age = %cached.age_string(), "loaded cached report");
            print_json(&cached.report)
        }
        None => {
            println!("no analysis has been cached yet");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
