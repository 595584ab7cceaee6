use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use shindan::export::{
    FlowDefinition, FulfillmentDefinition, IntentDefinition, MessageDefinition, PageDefinition,
    RouteDefinition, TextDefinition, TimeoutDefinition, WebhookDefinition,
};
use std::fs;
use std::path::Path;

/// A CLI tool to generate synthetic agent exports for the shindan analyzer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The directory to write the generated export to
    #[arg(short, long, default_value = "generated_agent")]
    output: String,

    /// Number of flows to generate
    #[arg(long, default_value_t = 3)]
    flows: usize,

    /// Number of pages per flow
    #[arg(long, default_value_t = 20)]
    pages: usize,

    /// Number of intents to declare
    #[arg(long, default_value_t = 30)]
    intents: usize,

    /// Number of webhooks to declare
    #[arg(long, default_value_t = 2)]
    webhooks: usize,

    /// Probability that a page is left without any incoming route
    #[arg(long, default_value_t = 0.1)]
    orphan_rate: f64,

    /// Seed for reproducible output, random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.orphan_rate) {
        eprintln!(
            "Error: --orphan-rate ({}) must be between 0 and 1",
            cli.orphan_rate
        );
        std::process::exit(1);
    }
    if cli.intents == 0 {
        eprintln!("Error: --intents must be at least 1");
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    println!(
        "Generating agent export ({} flow(s) x {} page(s), {} intent(s))...",
        cli.flows, cli.pages, cli.intents
    );

    let root = Path::new(&cli.output);
    let intents: Vec<String> = (0..cli.intents).map(|i| format!("intent_{:03}", i)).collect();
    let flow_names: Vec<String> = (0..cli.flows).map(|i| format!("Flow {}", i)).collect();
    let webhooks: Vec<String> = (0..cli.webhooks).map(|i| format!("webhook_{:02}", i)).collect();

    for (index, flow_name) in flow_names.iter().enumerate() {
        let context = FlowContext {
            flow_names: &flow_names,
            intents: &intents,
            webhooks: &webhooks,
        };
        let orphans = generate_flow(root, &mut rng, &cli, index, flow_name, &context)?;
        println!("-> Generated '{}' ({} orphan page(s)).", flow_name, orphans);
    }

    for (index, intent) in intents.iter().enumerate() {
        let dir = root.join("intents").join(intent);
        fs::create_dir_all(&dir)?;
        let definition = IntentDefinition {
            name: Some(format!("00000000-0000-0000-0000-{:012}", index)),
            display_name: Some(intent.clone()),
            ..Default::default()
        };
        write_json(&dir.join(format!("{}.json", intent)), &definition)?;
    }
    println!("-> Generated {} intent(s).", intents.len());

    if !webhooks.is_empty() {
        let dir = root.join("webhooks");
        fs::create_dir_all(&dir)?;
        for (index, webhook) in webhooks.iter().enumerate() {
            let definition = WebhookDefinition {
                name: Some(format!("00000000-0000-0000-0003-{:012}", index)),
                display_name: Some(webhook.clone()),
                generic_web_service: Some(serde_json::json!({
                    "uri": format!("https://example.com/{}", webhook)
                })),
                timeout: Some(TimeoutDefinition { seconds: Some(5) }),
            };
            write_json(&dir.join(format!("{}.json", webhook)), &definition)?;
        }
        println!("-> Generated {} webhook(s).", webhooks.len());
    }

    println!(
        "Successfully generated agent export in '{}'",
        root.display()
    );
    Ok(())
}

/// Names shared by every generated flow.
struct FlowContext<'a> {
    flow_names: &'a [String],
    intents: &'a [String],
    webhooks: &'a [String],
}

/// Writes one flow directory and returns how many pages were left orphaned.
fn generate_flow(
    root: &Path,
    rng: &mut StdRng,
    cli: &Cli,
    index: usize,
    flow_name: &str,
    context: &FlowContext<'_>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let FlowContext {
        flow_names,
        intents,
        webhooks,
    } = *context;
    let flow_dir = root.join("flows").join(flow_name);
    let pages_dir = flow_dir.join("pages");
    fs::create_dir_all(&pages_dir)?;

    let page_names: Vec<String> = (0..cli.pages).map(|i| format!("Page {}", i)).collect();
    // The first page always stays reachable so the start page has a route.
    let orphaned: Vec<bool> = page_names
        .iter()
        .enumerate()
        .map(|(i, _)| i > 0 && rng.random_bool(cli.orphan_rate))
        .collect();
    let targets: Vec<&String> = page_names
        .iter()
        .zip(&orphaned)
        .filter_map(|(name, orphan)| (!orphan).then_some(name))
        .collect();

    let start_routes = targets
        .iter()
        .take(3)
        .map(|page| intent_route(rng, intents, Some(page.as_str()), None))
        .collect();
    let start_page = FlowDefinition {
        name: Some(format!("00000000-0000-0000-0001-{:012}", index)),
        display_name: Some(flow_name.to_string()),
        transition_routes: start_routes,
        event_handlers: vec![RouteDefinition {
            event: Some("sys.no-match-default".to_string()),
            trigger_fulfillment: Some(text_fulfillment("Sorry, could you say that again?")),
            ..Default::default()
        }],
        ..Default::default()
    };
    write_json(&flow_dir.join(format!("{}.json", flow_name)), &start_page)?;

    for (page_index, page_name) in page_names.iter().enumerate() {
        let mut routes = Vec::new();
        // Some pages are left as dead ends.
        if !rng.random_bool(0.15) && !targets.is_empty() {
            for _ in 0..rng.random_range(1..=3) {
                let target = targets[rng.random_range(0..targets.len())];
                routes.push(intent_route(rng, intents, Some(target.as_str()), None));
            }
        }
        if flow_names.len() > 1 && rng.random_bool(0.05) {
            let other = &flow_names[rng.random_range(0..flow_names.len())];
            if other != flow_name {
                routes.push(intent_route(rng, intents, None, Some(other.as_str())));
            }
        }
        if rng.random_bool(0.1) {
            routes.push(RouteDefinition {
                condition: Some("true".to_string()),
                target_page: Some("End Session".to_string()),
                ..Default::default()
            });
        }

        let mut entry = text_fulfillment(&format!("Welcome to {}.", page_name));
        let mut event_handlers = Vec::new();
        if !webhooks.is_empty() && rng.random_bool(0.2) {
            let webhook = &webhooks[rng.random_range(0..webhooks.len())];
            entry.webhook = Some(serde_json::json!(webhook));
            // Some webhook pages are left without an error handler.
            if rng.random_bool(0.5) {
                event_handlers.push(RouteDefinition {
                    event: Some("webhook.error".to_string()),
                    target_page: Some("End Session".to_string()),
                    ..Default::default()
                });
            }
        }

        let page = PageDefinition {
            name: Some(format!("00000000-0000-0002-{:04}-{:012}", index, page_index)),
            display_name: Some(page_name.clone()),
            entry_fulfillment: Some(entry),
            transition_routes: routes,
            event_handlers,
            ..Default::default()
        };
        write_json(&pages_dir.join(format!("{}.json", page_name)), &page)?;
    }

    Ok(orphaned.iter().filter(|orphan| **orphan).count())
}

fn intent_route(
    rng: &mut StdRng,
    intents: &[String],
    target_page: Option<&str>,
    target_flow: Option<&str>,
) -> RouteDefinition {
    RouteDefinition {
        intent: Some(intents[rng.random_range(0..intents.len())].clone()),
        target_page: target_page.map(str::to_string),
        target_flow: target_flow.map(str::to_string),
        ..Default::default()
    }
}

fn text_fulfillment(message: &str) -> FulfillmentDefinition {
    FulfillmentDefinition {
        messages: vec![MessageDefinition {
            text: Some(TextDefinition {
                text: vec![message.to_string()],
            }),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
