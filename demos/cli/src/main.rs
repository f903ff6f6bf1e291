use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use timeline_core::grid::{format_year_range, is_important};
use timeline_core::{
    apply_cascade, filter_events, region_slug, EventBox, EventTone, GridLayout, PlacedEvent,
    Region, TagSelection, TagTaxonomy, TimelineConfig, TimelineEvent,
};
use timeline_data::{default_dataset, load_dataset_str, Dataset};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "timeline-cli",
    about = "Xem taxonomy thẻ và bố cục timeline lịch sử từ dòng lệnh."
)]
struct Args {
    /// File TOML ghi đè cấu hình timeline.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// File JSON taxonomy thẻ (đi cùng --events).
    #[arg(long, global = true, requires = "events")]
    taxonomy: Option<PathBuf>,

    /// File JSON danh sách sự kiện (đi cùng --taxonomy).
    #[arg(long, global = true, requires = "taxonomy")]
    events: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// In cây thẻ.
    Tags,
    /// In các khu vực cùng slug đường dẫn.
    Regions,
    /// Xếp làn và in các sự kiện đã lọc.
    Layout {
        /// Bật một thẻ (theo tầng). Có thể lặp lại.
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Chỉ giữ một khu vực (tên hiển thị hoặc slug).
        #[arg(short, long)]
        region: Option<String>,
        /// In JSON thay vì bảng.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct LayoutRow<'a> {
    #[serde(flatten)]
    placed: PlacedEvent<'a>,
    #[serde(rename = "box")]
    event_box: EventBox,
    tone: EventTone,
    important: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let dataset = load_dataset(args.taxonomy.as_deref(), args.events.as_deref())?;
    info!(
        events = dataset.events.len(),
        start_year = config.start_year,
        end_year = config.end_year(),
        "dataset ready"
    );

    match args.command {
        Command::Tags => print_taxonomy(&dataset.taxonomy),
        Command::Regions => {
            for region in Region::ALL {
                println!("{:<22} #/region/{}", region.display_name(), region_slug(region));
            }
        }
        Command::Layout { tags, region, json } => {
            let region = region.as_deref().map(parse_region).transpose()?;
            print_layout(&dataset, &config, &tags, region, json)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TimelineConfig> {
    let Some(path) = path else {
        return Ok(TimelineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file cấu hình {:?}", path))?;
    let config: TimelineConfig =
        toml::from_str(&text).with_context(|| format!("Cấu hình không hợp lệ: {:?}", path))?;
    debug!(?config, "loaded config");
    Ok(config)
}

fn load_dataset(taxonomy: Option<&Path>, events: Option<&Path>) -> anyhow::Result<Dataset> {
    match (taxonomy, events) {
        (Some(taxonomy), Some(events)) => {
            let tags_json = fs::read_to_string(taxonomy)
                .with_context(|| format!("Không đọc được file {:?}", taxonomy))?;
            let events_json = fs::read_to_string(events)
                .with_context(|| format!("Không đọc được file {:?}", events))?;
            load_dataset_str(&tags_json, &events_json).context("Dữ liệu timeline không hợp lệ")
        }
        _ => default_dataset().context("Không đọc được dataset mặc định"),
    }
}

fn parse_region(value: &str) -> anyhow::Result<Region> {
    match Region::from_slug(value).or_else(|| Region::from_name(value)) {
        Some(region) => Ok(region),
        None => bail!("Không có khu vực '{value}'"),
    }
}

fn print_taxonomy(taxonomy: &TagTaxonomy) {
    fn walk(taxonomy: &TagTaxonomy, tag: &str, depth: usize) {
        println!("{}{}", "  ".repeat(depth), tag);
        for child in taxonomy.children_of(tag) {
            walk(taxonomy, child, depth + 1);
        }
    }

    for tag in taxonomy.top_level_tags() {
        walk(taxonomy, tag, 0);
    }
}

fn select_tags(tags: &[String], taxonomy: &TagTaxonomy) -> TagSelection {
    tags.iter().fold(TagSelection::new(), |selection, tag| {
        apply_cascade(&selection, tag, taxonomy)
    })
}

fn print_layout(
    dataset: &Dataset,
    config: &TimelineConfig,
    tags: &[String],
    region: Option<Region>,
    json: bool,
) -> anyhow::Result<()> {
    let selection = select_tags(tags, &dataset.taxonomy);
    let mut events: Vec<&TimelineEvent> =
        filter_events(&dataset.events, &selection, &dataset.taxonomy);
    if let Some(region) = region {
        events.retain(|event| event.region == region);
    }

    let grid = GridLayout::build(&events, config);
    let rows: Vec<LayoutRow<'_>> = grid
        .placed
        .iter()
        .map(|placed| LayoutRow {
            placed: placed.clone(),
            event_box: grid.event_box(placed),
            tone: EventTone::classify(placed.event.tags.as_slice()),
            important: is_important(placed.event),
        })
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&rows).context("Không serialize layout")?;
        println!("{text}");
        return Ok(());
    }

    println!(
        "Selected tags: {}",
        selection.iter().collect::<Vec<_>>().join(", ")
    );
    println!("Columns: {}", grid.columns.iter().map(|r| r.display_name()).collect::<Vec<_>>().join(" | "));
    for row in &rows {
        let event = row.placed.event;
        println!(
            "{:<22} {:<4} {:<32} {:<20} lane {}/{}  top {:>7.1}px  left {:>5.1}%  width {:>5.1}%",
            event.region.display_name(),
            event.id,
            event.name,
            format_year_range(event.start_year, event.end_year),
            row.placed.lane.position + 1,
            row.placed.lane.total_in_row,
            row.event_box.top,
            row.event_box.left,
            row.event_box.width,
        );
    }
    Ok(())
}
