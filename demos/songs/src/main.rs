//! songs — the singer walkthrough for the rust_mixin framework.
//!
//! Two behaviors both define `initialize`.  `HasAwards` is tagged `after`,
//! so its initializer runs first and the composed call returns whatever
//! `SingsSongs` returns.  Each behavior keeps its song or award list in its
//! own private context; neither can see the other's state.
//!
//! Run with `RUST_LOG=debug` to watch the fold.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mx_behavior::{
    Behavior, BehaviorDefinition, EncapsulatedBehavior, MethodRegistry, Participant, PolicyTag,
    encapsulate, resolve,
};
use mx_compose::{ComposeConfig, ComposeObserver, ComposedBehavior, Composer};
use mx_core::{ChainRegistry, ChainRegistryBuilder, ChainRootId, Value, arg};

// ── Private state ─────────────────────────────────────────────────────────────

#[derive(Default, Clone)]
struct Songs(Vec<Value>);

#[derive(Default, Clone)]
struct Awards(Vec<Value>);

// ── Config ────────────────────────────────────────────────────────────────────

const CONFIG_JSON: &str = r#"{ "name": "Singer", "require_complete": true }"#;

// ── Observer ──────────────────────────────────────────────────────────────────

struct PrintSteps;

impl ComposeObserver for PrintSteps {
    fn on_install(&mut self, participant: &str, member: &str, kind: &'static str) {
        println!("  install  {participant}.{member} ({kind})");
    }

    fn on_resolve(&mut self, participant: &str, member: &str, policy: &str) {
        println!("  resolve  {participant}.{member} via {policy}");
    }
}

fn sings_songs() -> BehaviorDefinition {
    BehaviorDefinition::new("SingsSongs")
        .dependency("stageName")
        .method("initialize", |ctx, _| {
            println!("  SingsSongs.initialize");
            ctx.with_state(|s: &mut Songs| s.0.clear());
            Ok(ctx.this())
        })
        .method("addSong", |ctx, args| {
            let title = arg(args, 0, "addSong", "string", Value::as_str)?.to_string();
            ctx.with_state(|s: &mut Songs| s.0.push(Value::from(title)));
            Ok(ctx.this())
        })
        .method("songs", |ctx, _| Ok(Value::List(ctx.state::<Songs>().0)))
        .method("perform", |ctx, _| {
            let name = ctx.call("stageName", &[])?;
            let count = ctx.state::<Songs>().0.len();
            Ok(Value::from(format!("{name} performs {count} songs")))
        })
}

fn has_awards() -> BehaviorDefinition {
    BehaviorDefinition::new("HasAwards")
        .method("initialize", |ctx, _| {
            println!("  HasAwards.initialize");
            ctx.with_state(|a: &mut Awards| a.0.clear());
            Ok(ctx.this())
        })
        .method("addAward", |ctx, args| {
            let title = arg(args, 0, "addAward", "string", Value::as_str)?.to_string();
            ctx.with_state(|a: &mut Awards| a.0.push(Value::from(title)));
            Ok(ctx.this())
        })
        .method("awards", |ctx, _| Ok(Value::List(ctx.state::<Awards>().0)))
}

/// Build the object model: a single `Performer` root whose `stageName` is
/// looked up in `names` on every call, so rebinding it later is visible to
/// existing instances.
fn stage(names: &MethodRegistry) -> Result<(ChainRegistry, ChainRootId)> {
    let mut model = ChainRegistryBuilder::new();
    let performer = model.root("Performer", None);
    model.method(performer, "stageName", names.late_bound("stageName"))?;
    Ok((model.build()?, performer))
}

/// Compose the singer from [`CONFIG_JSON`]. The encapsulated `SingsSongs` is
/// returned alongside so its context count can be reported.
fn singer(
    model: &ChainRegistry,
    performer: ChainRootId,
    observer: &mut dyn ComposeObserver,
) -> Result<(ComposedBehavior, EncapsulatedBehavior)> {
    let songs = encapsulate(&sings_songs().chain_root(performer));
    let awards = resolve(&encapsulate(&has_awards()), [("initialize", PolicyTag::After)])?;

    let config: ComposeConfig = serde_json::from_str(CONFIG_JSON)?;
    println!("composing {:?}:", config.name.as_deref().unwrap_or_default());
    let singer = Composer::new(model)
        .with(&songs)
        .with(&awards)
        .config(config)
        .compose_observed(observer)?;
    Ok((singer, songs))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let names = MethodRegistry::new();
    names.define("stageName", mx_core::method(|_, _| Ok(Value::from("Freddie"))));
    let (model, performer) = stage(&names)?;

    let (singer, songs) = singer(&model, performer, &mut PrintSteps)?;
    info!(behavior = singer.name(), members = singer.slots().len(), "ready");

    // ── Use ───────────────────────────────────────────────────────────────────
    let star = singer.instantiate(&model)?;
    println!("initialize:");
    star.call("initialize", &[])?;

    let same = star.call("addSong", &[Value::from("Bohemian Rhapsody")])?;
    if let Some(same) = same.as_instance() {
        same.call("addSong", &[Value::from("Somebody to Love")])?;
    }
    star.call("addAward", &[Value::from("Grammy")])?;

    println!("songs:   {}", star.call("songs", &[])?);
    println!("awards:  {}", star.call("awards", &[])?);
    println!("perform: {}", star.call("perform", &[])?);

    names.define("stageName", mx_core::method(|_, _| Ok(Value::from("Mercury"))));
    println!("perform: {}", star.call("perform", &[])?);

    let other = singer.instantiate(&model)?;
    println!("a second singer starts empty: {}", other.call("songs", &[])?);
    println!("contexts created: songs={}, on star={}", songs.contexts_created(), star.context_count());

    Ok(())
}
