//! Unit tests for mx-behavior.

use std::sync::Arc;

use mx_core::{ChainRegistry, Instance, Method, ObjectModel, Value, method};
use parking_lot::Mutex;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn bare_instance() -> Instance {
    ChainRegistry::empty().create_instance(None).unwrap()
}

type Log = Arc<Mutex<Vec<&'static str>>>;

/// A method that records `tag` and returns it.
fn logging(log: &Log, tag: &'static str) -> Method {
    let log = Arc::clone(log);
    method(move |_, _| {
        log.lock().push(tag);
        Ok(Value::from(tag))
    })
}

// ── Encapsulation ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod encapsulation {
    use mx_core::{CallError, Value, arg};

    use super::*;
    use crate::{Behavior, BehaviorDefinition, Participant, encapsulate};

    #[derive(Default, Clone)]
    struct Songs(Vec<Value>);

    fn sings_songs() -> BehaviorDefinition {
        BehaviorDefinition::new("SingsSongs")
            .method("initialize", |ctx, _| {
                ctx.with_state(|s: &mut Songs| s.0.clear());
                Ok(ctx.this())
            })
            .method("addSong", |ctx, args| {
                let title = arg(args, 0, "addSong", "string", Value::as_str)?.to_string();
                ctx.with_state(|s: &mut Songs| s.0.push(Value::from(title)));
                Ok(ctx.this())
            })
            .method("songs", |ctx, _| Ok(Value::List(ctx.state::<Songs>().0)))
    }

    #[test]
    fn public_surface_excludes_private_methods() {
        let b = encapsulate(
            &sings_songs()
                .private("_count", |ctx, _| Ok(Value::from(ctx.state::<Songs>().0.len() as i64)))
                .dependency("name")
                .property("genre", "rock"),
        );
        assert_eq!(b.method_names(), vec!["addSong", "initialize", "songs"]);
        assert_eq!(b.dependency_names(), vec!["name"]);
        assert!(!b.slots().contains_key("_count"));
        assert_eq!(b.slots()["genre"].kind(), "property");
    }

    #[test]
    fn fluent_context_return_becomes_receiver() {
        let b = encapsulate(&sings_songs());
        let obj = bare_instance();
        b.attach(&obj);
        let out = obj.call("addSong", &[Value::from("Penny Lane")]).unwrap();
        assert_eq!(out, Value::Instance(obj.clone()));
        assert_eq!(obj.call("songs", &[]).unwrap(), Value::from(vec!["Penny Lane"]));
    }

    #[test]
    fn contexts_are_isolated_per_receiver() {
        let b = encapsulate(&sings_songs());
        let (one, two) = (bare_instance(), bare_instance());
        b.attach(&one);
        b.attach(&two);
        one.call("addSong", &[Value::from("x")]).unwrap();
        assert_eq!(two.call("songs", &[]).unwrap(), Value::List(vec![]));
        assert_eq!(one.call("songs", &[]).unwrap(), Value::from(vec!["x"]));
    }

    #[test]
    fn one_context_per_receiver() {
        let b = encapsulate(&sings_songs());
        let obj = bare_instance();
        b.attach(&obj);
        assert_eq!(b.contexts_created(), 0);
        obj.call("initialize", &[]).unwrap();
        obj.call("addSong", &[Value::from("a")]).unwrap();
        obj.call("songs", &[]).unwrap();
        obj.call("addSong", &[Value::from("b")]).unwrap();
        assert_eq!(b.contexts_created(), 1);
        assert_eq!(obj.context_count(), 1);
    }

    #[test]
    fn two_behaviors_get_separate_contexts_on_one_receiver() {
        let songs = encapsulate(&sings_songs());
        let counter = encapsulate(&BehaviorDefinition::new("Counter").method("bump", |ctx, _| {
            Ok(Value::from(ctx.with_state(|n: &mut i64| {
                *n += 1;
                *n
            })))
        }));
        let obj = bare_instance();
        songs.attach(&obj);
        counter.attach(&obj);
        obj.call("addSong", &[Value::from("a")]).unwrap();
        assert_eq!(obj.call("bump", &[]).unwrap(), Value::from(1));
        assert_eq!(obj.context_count(), 2);
    }

    #[test]
    fn private_methods_are_callable_from_the_context_only() {
        let b = encapsulate(
            &sings_songs()
                .private("_count", |ctx, _| Ok(Value::from(ctx.state::<Songs>().0.len() as i64)))
                .method("count", |ctx, _| ctx.call("_count", &[])),
        );
        let obj = bare_instance();
        b.attach(&obj);
        obj.call("addSong", &[Value::from("a")]).unwrap();
        assert_eq!(obj.call("count", &[]).unwrap(), Value::from(1));
        assert!(matches!(obj.call("_count", &[]), Err(CallError::MethodNotFound { .. })));
    }

    #[test]
    fn undeclared_names_are_not_in_scope() {
        let b = encapsulate(
            &sings_songs().method("peek", |ctx, _| ctx.call("songs", &[])),
        );
        let obj = bare_instance();
        b.attach(&obj);
        assert_eq!(
            obj.call("peek", &[]).unwrap_err(),
            CallError::NotInScope { name: "songs".into(), behavior: "SingsSongs".into() }
        );
    }

    #[test]
    fn bad_argument_surfaces_from_body() {
        let b = encapsulate(&sings_songs());
        let obj = bare_instance();
        b.attach(&obj);
        assert!(matches!(
            obj.call("addSong", &[Value::from(3)]),
            Err(CallError::BadArgument { index: 0, .. })
        ));
    }

    #[test]
    fn instantiate_binds_chain_root() {
        let mut builder = mx_core::ChainRegistryBuilder::new();
        let person = builder.root("Person", None);
        let reg = builder.build().unwrap();
        let b = encapsulate(&sings_songs().chain_root(person));
        let obj = b.instantiate(&reg).unwrap();
        assert_eq!(obj.chain_root(), Some(person));
        assert!(obj.responds_to("songs"));
    }
}

// ── Private context builder ───────────────────────────────────────────────────

#[cfg(test)]
mod context {
    use mx_core::{CallError, Member, Value, method};
    use rustc_hash::FxHashMap;

    use super::*;
    use crate::{Behavior, BehaviorDefinition, build_context, encapsulate};

    #[test]
    fn dependency_forwards_to_receiver() {
        let obj = bare_instance();
        obj.define("name", Member::Method(method(|_, _| Ok(Value::from("Ringo")))));
        let ctx = build_context(&obj, Arc::from("Greets"), &[Arc::from("name")], &FxHashMap::default());
        assert_eq!(ctx.call("name", &[]).unwrap(), Value::from("Ringo"));
        assert!(!ctx.has("greet"));
    }

    #[test]
    fn receiver_self_return_maps_to_context() {
        let obj = bare_instance();
        obj.define("touch", Member::Method(method(|this, _| Ok(Value::Instance(this.clone())))));
        let ctx = build_context(&obj, Arc::from("Fluent"), &[Arc::from("touch")], &FxHashMap::default());
        let out = ctx.call("touch", &[]).unwrap();
        assert_eq!(out, ctx.this());
    }

    #[test]
    fn unsatisfied_dependency_fails_at_call_time() {
        let greets = encapsulate(
            &BehaviorDefinition::new("Greets")
                .dependency("name")
                .method("greet", |ctx, _| {
                    let name = ctx.call("name", &[])?;
                    Ok(Value::from(format!("hello, {name}")))
                }),
        );
        let obj = bare_instance();
        greets.attach(&obj);
        assert_eq!(
            obj.call("greet", &[]).unwrap_err(),
            CallError::MissingImplementation { name: "name".into() }
        );

        obj.define("name", Member::Method(method(|_, _| Ok(Value::from("Paul")))));
        assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("hello, Paul"));
    }

    #[test]
    fn attaching_a_dependency_keeps_the_existing_method() {
        let named = encapsulate(
            &BehaviorDefinition::new("Named").method("name", |_, _| Ok(Value::from("John"))),
        );
        let greets = encapsulate(
            &BehaviorDefinition::new("Greets")
                .dependency("name")
                .method("greet", |ctx, _| {
                    let name = ctx.call("name", &[])?;
                    Ok(Value::from(format!("hello, {name}")))
                }),
        );
        let obj = bare_instance();
        named.attach(&obj);
        greets.attach(&obj);
        assert!(obj.responds_to("name"));
        assert_eq!(obj.call("greet", &[]).unwrap(), Value::from("hello, John"));

        let fresh = bare_instance();
        greets.attach(&fresh);
        assert!(fresh.has_member("name"));
        assert!(!fresh.responds_to("name"));
    }

    #[test]
    fn dropped_receiver_is_reported() {
        let obj = bare_instance();
        let ctx = build_context(&obj, Arc::from("Orphan"), &[Arc::from("name")], &FxHashMap::default());
        drop(obj);
        assert_eq!(ctx.call("name", &[]).unwrap_err(), CallError::ReceiverDropped);
    }

    #[test]
    fn concurrent_first_calls_share_one_context() {
        let b = encapsulate(&BehaviorDefinition::new("Counter").method("bump", |ctx, _| {
            ctx.with_state(|n: &mut i64| *n += 1);
            Ok(Value::Unit)
        }).method("count", |ctx, _| Ok(Value::from(ctx.state::<i64>()))));
        let obj = bare_instance();
        b.attach(&obj);

        let barrier = std::sync::Barrier::new(8);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    barrier.wait();
                    obj.call("bump", &[]).unwrap();
                });
            }
        });

        assert_eq!(b.contexts_created(), 1);
        assert_eq!(obj.call("count", &[]).unwrap(), Value::from(8));
    }
}

// ── Policies ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod policies {
    use std::str::FromStr;

    use mx_core::{CallError, Value, method};

    use super::*;
    use crate::policy::{after, around, before, discard, overwrite};
    use crate::{BehaviorError, PolicyLibrary, PolicyTag};

    #[test]
    fn overwrite_keeps_existing_and_discard_keeps_new() {
        let log: Log = Arc::default();
        let obj = bare_instance();
        let kept = overwrite(logging(&log, "new"), logging(&log, "existing"));
        assert_eq!(kept(&obj, &[]).unwrap(), Value::from("existing"));
        let kept = discard(logging(&log, "new"), logging(&log, "existing"));
        assert_eq!(kept(&obj, &[]).unwrap(), Value::from("new"));
        assert_eq!(*log.lock(), vec!["existing", "new"]);
    }

    #[test]
    fn before_runs_existing_first_and_returns_new() {
        let log: Log = Arc::default();
        let merged = before(logging(&log, "new"), logging(&log, "existing"));
        assert_eq!(merged(&bare_instance(), &[]).unwrap(), Value::from("new"));
        assert_eq!(*log.lock(), vec!["existing", "new"]);
    }

    #[test]
    fn after_runs_new_first_and_returns_existing() {
        let log: Log = Arc::default();
        let merged = after(logging(&log, "new"), logging(&log, "existing"));
        assert_eq!(merged(&bare_instance(), &[]).unwrap(), Value::from("existing"));
        assert_eq!(*log.lock(), vec!["new", "existing"]);
    }

    #[test]
    fn around_passes_existing_as_proceed() {
        let existing = method(|_, args| Ok(Value::from(args[0].as_int().unwrap_or(0) + 1)));
        let new = method(|_, args| {
            let proceed = args[0].as_function().ok_or(CallError::Failed("no proceed".into()))?;
            let inner = proceed.call(&args[1..])?;
            Ok(Value::from(inner.as_int().unwrap_or(0) * 10))
        });
        let merged = around(new, existing);
        assert_eq!(merged(&bare_instance(), &[Value::from(4)]).unwrap(), Value::from(50));
    }

    #[test]
    fn first_failure_stops_the_chain() {
        let log: Log = Arc::default();
        let failing = method(|_, _| Err(CallError::Failed("boom".into())));
        let merged = before(logging(&log, "new"), failing);
        assert!(merged(&bare_instance(), &[]).is_err());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn tags_parse_and_display() {
        for tag in PolicyTag::ALL {
            assert_eq!(PolicyTag::from_str(tag.as_str()).unwrap(), tag);
            assert_eq!(tag.to_string(), tag.as_str());
        }
        assert_eq!(
            PolicyTag::from_str("replace").unwrap_err(),
            BehaviorError::UnknownPolicy("replace".into())
        );
    }

    #[test]
    fn library_holds_builtins_and_custom_policies() {
        let mut lib = PolicyLibrary::default();
        assert_eq!(lib.tags(), vec!["after", "around", "before", "discard", "overwrite"]);
        assert!(!lib.contains("both"));

        let log: Log = Arc::default();
        lib.register("both", |new, existing| before(new, existing));
        let merged = lib.apply("both", logging(&log, "new"), logging(&log, "existing")).unwrap();
        merged(&bare_instance(), &[]).unwrap();
        assert_eq!(*log.lock(), vec!["existing", "new"]);
        assert!(lib.apply("nope", logging(&log, "a"), logging(&log, "b")).is_none());
        assert!(PolicyLibrary::empty().tags().is_empty());
    }
}

// ── resolve ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod resolution {
    use mx_core::Value;

    use crate::{BehaviorDefinition, BehaviorError, Participant, PolicyTag, Slot, encapsulate, resolve};

    fn awards() -> crate::EncapsulatedBehavior {
        encapsulate(
            &BehaviorDefinition::new("HasAwards")
                .method("initialize", |ctx, _| Ok(ctx.this()))
                .method("awards", |_, _| Ok(Value::List(vec![])))
                .dependency("name"),
        )
    }

    #[test]
    fn resolve_copies_and_leaves_original_untouched() {
        let b = awards();
        let tagged = resolve(&b, [("initialize", PolicyTag::After)]).unwrap();
        assert!(b.slots()["initialize"].is_method());
        match &tagged.slots()["initialize"] {
            Slot::Resolution(d) => assert_eq!(&*d.policy, "after"),
            other => panic!("expected resolution, got {other:?}"),
        }
        assert!(tagged.slots()["awards"].is_method());
        assert_eq!(tagged.name(), "HasAwards");
    }

    #[test]
    fn retagging_replaces_policy() {
        let tagged = resolve(&awards(), [("initialize", "before")]).unwrap();
        let retagged = resolve(&tagged, [("initialize", "around")]).unwrap();
        match &retagged.slots()["initialize"] {
            Slot::Resolution(d) => assert_eq!(&*d.policy, "around"),
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn only_public_methods_can_be_resolved() {
        let err = resolve(&awards(), [("name", "after")]).unwrap_err();
        assert_eq!(
            err,
            BehaviorError::NotAMethod { behavior: "HasAwards".into(), name: "name".into() }
        );
        assert!(resolve(&awards(), [("missing", "after")]).is_err());
    }

    #[test]
    fn unknown_tags_are_accepted_until_composition() {
        assert!(resolve(&awards(), [("initialize", "sideways")]).is_ok());
    }
}

// ── Late binding ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod late_binding {
    use mx_core::{CallError, Member, Value, method};

    use super::*;
    use crate::{MethodRegistry, forward};

    #[test]
    fn late_bound_sees_reassignment_early_bound_does_not() {
        let reg = MethodRegistry::new();
        reg.define("greet", method(|_, _| Ok(Value::from("hi"))));
        let late = reg.late_bound("greet");
        let early = reg.early_bound("greet").unwrap();

        reg.define("greet", method(|_, _| Ok(Value::from("hello"))));
        let obj = bare_instance();
        assert_eq!(late(&obj, &[]).unwrap(), Value::from("hello"));
        assert_eq!(early(&obj, &[]).unwrap(), Value::from("hi"));
    }

    #[test]
    fn unbound_name_fails_at_call_time() {
        let reg = MethodRegistry::new();
        let late = reg.late_bound("greet");
        assert!(reg.early_bound("greet").is_err());
        assert_eq!(
            late(&bare_instance(), &[]).unwrap_err(),
            CallError::MissingImplementation { name: "greet".into() }
        );
        reg.define("greet", method(|_, _| Ok(Value::Unit)));
        assert!(late(&bare_instance(), &[]).is_ok());
        assert!(reg.remove("greet").is_some());
        assert!(!reg.contains("greet"));
    }

    #[test]
    fn forward_runs_against_the_target() {
        let target = bare_instance();
        target.define("me", Member::Method(method(|this, _| Ok(Value::Instance(this.clone())))));
        let caller = bare_instance();
        caller.define("me", Member::Method(forward(target.clone(), "me")));
        assert_eq!(caller.call("me", &[]).unwrap(), Value::Instance(target.clone()));

        target.define("me", Member::Method(method(|_, _| Ok(Value::from("rebound")))));
        assert_eq!(caller.call("me", &[]).unwrap(), Value::from("rebound"));
    }
}
