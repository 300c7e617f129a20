use std::sync::Arc;
use std::thread;

use infection_models::models::prior::{CONTACTED_PEOPLE_SITE, PROTOCOL_SITE};
use infection_models::prelude::*;

const N_DRAWS: u32 = 10_000;

#[test]
fn prior_samples_stay_in_domain() {
    let mut context = Context::new();
    context.init_random(1);
    let settings = [
        Hyperparameters::default(),
        Hyperparameters {
            distancing: 0.9,
            normal_contact: 5.0,
            distance_contact: 0.5,
            normal_ir_conc: (1.0, 1.0),
            distance_ir_conc: (0.5, 0.5),
        },
    ];
    for hyperparameters in &settings {
        for _ in 0..1000 {
            let (scenario, _) = context
                .trace_model(|context| sample_transmission(context, hyperparameters))
                .unwrap();
            let (protocol, _contacted_people, infection_rate, _num_infected) =
                scenario.into_tuple();
            assert!(protocol == "normal_behavior" || protocol == "social_distancing");
            assert!((0.0..=1.0).contains(&infection_rate));
        }
    }
}

#[test]
fn normal_behavior_fraction_matches_distancing() {
    let mut context = Context::new();
    context.init_random(2024);
    let hyperparameters = Hyperparameters {
        distancing: 0.3,
        ..Hyperparameters::default()
    };
    let mut normal = 0;
    for _ in 0..N_DRAWS {
        let (scenario, _) = context
            .trace_model(|context| sample_transmission(context, &hyperparameters))
            .unwrap();
        if scenario.protocol == Protocol::NormalBehavior {
            normal += 1;
        }
    }
    // Standard deviation of the fraction is about 0.0046.
    let fraction = f64::from(normal) / f64::from(N_DRAWS);
    assert!((fraction - 0.3).abs() < 0.02, "fraction was {fraction}");
}

#[test]
fn conditioned_protocol_gives_normal_contact_mean() {
    let mut context = Context::new();
    context.init_random(7);
    context.condition(PROTOCOL_SITE, Protocol::NormalBehavior.flag());
    let mut total = 0_u64;
    for _ in 0..N_DRAWS {
        let (scenario, trace) = context.trace_model(sample_default_transmission).unwrap();
        assert_eq!(scenario.protocol, Protocol::NormalBehavior);
        assert_eq!(trace.get(PROTOCOL_SITE).unwrap().kind, SiteKind::Observed);
        assert_eq!(trace.get(CONTACTED_PEOPLE_SITE).unwrap().kind, SiteKind::Latent);
        total += scenario.contacted_people;
    }
    // Standard error of the mean is 0.1.
    #[allow(clippy::cast_precision_loss)]
    let mean = total as f64 / f64::from(N_DRAWS);
    assert!((mean - 100.0).abs() < 0.6, "mean was {mean}");
}

#[test]
fn observation_model_registers_latents() {
    let mut context = Context::new();
    context.init_random(11);
    let store = ParamStore::new();
    let records = vec![ObservationRecord::new("normal_behavior", 40.0)];
    let ((), trace) = context
        .trace_model(|context| observe_transmission(context, &store, &records))
        .unwrap();
    assert!(trace.contains("contacted_people_0"));
    assert!(trace.contains("infection_rate_0"));
    assert_eq!(trace.get("num_infected_0").unwrap().kind, SiteKind::Observed);
}

#[test]
fn observation_model_rejects_unknown_protocol() {
    let mut context = Context::new();
    let store = ParamStore::new();
    let records = vec![ObservationRecord::new("unknown_protocol", 5.0)];
    let error = observe_transmission(&mut context, &store, &records).unwrap_err();
    match &error {
        ModelError::InvalidProtocol { index, value } => {
            assert_eq!(*index, 0);
            assert_eq!(value, "unknown_protocol");
        }
        other => panic!("expected an invalid protocol error, got {other:?}"),
    }
    assert!(error.to_string().contains("unknown_protocol"));
    assert!(context.get_trace().is_none_or(Trace::is_empty));
}

#[test]
fn parameterized_sampler_shares_distancing() {
    let mut context = Context::new();
    context.init_random(3);
    let store = ParamStore::new();
    let init = Hyperparameters::default();

    context
        .trace_model(|context| sample_learned_transmission(context, &store, &init))
        .unwrap();
    let first = store.get("distancing").unwrap();
    context
        .trace_model(|context| sample_learned_transmission(context, &store, &init))
        .unwrap();
    let second = store.get("distancing").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    let again = store
        .get_or_create("distancing", 0.5, Constraint::UnitInterval)
        .unwrap();
    assert!(Arc::ptr_eq(&again, &first));
}

#[test]
fn shared_store_across_threads() {
    let store = Arc::new(ParamStore::new());
    let workers: Vec<_> = (0..4_u64)
        .map(|seed| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut context = Context::new();
                context.init_random(seed);
                let init = Hyperparameters::default();
                for _ in 0..100 {
                    context
                        .trace_model(|context| sample_learned_transmission(context, &store, &init))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(store.len(), 7);
}

#[test]
fn missing_mapping_key_is_named() {
    let mut context = Context::new();
    let mapping = serde_json::json!({
        "normal_contact": 100.0,
        "distance_contact": 30.0,
        "normal_ir_conc": [6.0, 24.0],
        "distance_ir_conc": [3.0, 27.0]
    });
    let error = sample_transmission_from_value(&mut context, &mapping).unwrap_err();
    assert!(matches!(&error, ModelError::MissingHyperparameter(key) if key == "distancing"));
    assert!(error.to_string().contains("distancing"));
}

#[test]
fn likelihood_weighting_runs_end_to_end() {
    let mut context = Context::new();
    context.init_random(99);
    let store = ParamStore::new();
    let records: Vec<ObservationRecord> = [
        ("normal_behavior", 18.0),
        ("social_distancing", 2.0),
        ("social_distancing", 4.0),
    ]
    .into_iter()
    .map(Into::into)
    .collect();
    let estimate = estimate_log_evidence(
        &mut context,
        &store,
        &ObservationModel::default(),
        &records,
        200,
    )
    .unwrap();
    assert!(estimate.log_evidence.is_finite());
    assert!(estimate.log_evidence < 0.0);
    assert!(estimate.effective_sample_size >= 1.0 - 1e-9);
    assert!(estimate.effective_sample_size <= 200.0 + 1e-9);
}

#[test]
fn rejected_parameter_step_keeps_sampler_usable() {
    let mut context = Context::new();
    context.init_random(5);
    let store = ParamStore::new();
    let init = Hyperparameters::default();
    context
        .trace_model(|context| sample_learned_transmission(context, &store, &init))
        .unwrap();

    let contact = store.get("normal_contact").unwrap();
    assert!(contact.set_unconstrained(-800.0).is_err());
    assert!(contact.set_unconstrained(1000.0).is_err());

    for _ in 0..10 {
        context
            .trace_model(|context| sample_learned_transmission(context, &store, &init))
            .unwrap();
    }
}
