//! End-to-end tests for `Processor::load`.
//!
//! The `test` loader serves a fixed set of named layers that exercise
//! merging, includes, references and interpolation together.

use appconf::config::{Node, Processor, ProcessorConfig};
use appconf::error::ErrorCode;
use appconf::loaders::MapLoader;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

fn fixture_layers() -> MapLoader {
    MapLoader::new()
        .with_layer(
            "foo",
            json!({
                "paramA": "foo:valA",
                "paramB": "foo:valB",

                "paramD": {
                    "paramDA": "foo:valDA",
                    "paramDB": "foo:valDB",
                    "paramDE": "foo:${.paramDC}",

                    "paramDF": [
                        "foo:valDFA",
                        "foo:valDFB",
                        "foo:${..paramDA}"
                    ]
                },

                "paramE": ["foo:valEA", "foo:valEB"],

                "paramF": "foo:${paramB}",
                "paramH": "foo:${paramE.0}",
                "paramJ": "foo:${paramI}",
                "paramL": "foo:$${paramD.paramDE}:${}:$${paramD.paramDA}",

                "paramN": {
                    "paramNA": "foo:valNA",
                    "paramNB": "foo:valNB",

                    "paramNC": {
                        "paramNCA": "foo:valNCA",
                        "paramNCB": "foo:valNCB",
                        "paramNCE": {"_ref": "..paramNB"}
                    }
                },

                "paramO": {"_include": ["test:moo", "test:jar"]}
            }),
        )
        .with_layer(
            "bar",
            json!({
                "paramB": "bar:valB",
                "paramC": "bar:valC",

                "paramD": {
                    "paramDB": "bar:valDB",
                    "paramDC": "bar:valDC"
                },

                "paramE": ["bar:valEA", "bar:valEB"],

                "paramG": "bar:${paramD.paramDA}",
                "paramI": "bar:${paramH}",
                "paramK": "bar:${paramD.paramDF.1}:${paramD.paramDE}",
                "paramM": {"_ref": "paramD"},

                "paramN": {
                    "paramNC": {
                        "paramNCB": "bar:valNCB",
                        "paramNCC": "bar:valNCC",
                        "paramNCD": "bar:${paramN.paramNC.paramNCA}"
                    }
                },

                "paramP": {"_ref": "paramO.paramOD"},

                "paramS": {
                    "_ref": {"name": "paramX", "default": "bar:valS"}
                },

                "paramT": {
                    "_ref": {"firstDefined": ["paramX", "paramY"], "default": "bar:valT"}
                },

                "paramY": "bar:valY"
            }),
        )
        .with_layer(
            "moo",
            json!({
                "paramOA": "moo:valOA",
                "paramOB": "moo:valOB",

                "paramOD": {
                    "paramODA": "moo:valODA",
                    "paramODB": "moo:valODB"
                }
            }),
        )
        .with_layer(
            "jar",
            json!({
                "paramOB": "jar:valOB",
                "paramOC": "jar:valOC",

                "paramOD": {
                    "paramODB": "jar:valODB",
                    "paramODC": "jar:valODC",
                    "paramODD": "jar:${paramN.paramNC.paramNCB}"
                },

                "paramOE": {"_include": ["test:zoo"]}
            }),
        )
        .with_layer("zoo", json!(["zoo:valA", "zoo:valB"]))
        .with_layer("invalid_ref", json!({"paramQ": {"_ref": 42}}))
        .with_layer(
            "invalid_ref_name",
            json!({"_ref": {"name": 42, "default": "foo"}}),
        )
        .with_layer(
            "invalid_ref_first_defined",
            json!({"_ref": {"firstDefined": 42, "default": "bar:valT"}}),
        )
        .with_layer(
            "invalid_ref_first_defined_argument",
            json!({"_ref": {"firstDefined": [42], "default": "bar:valT"}}),
        )
        .with_layer("invalid_include", json!({"paramQ": {"_include": 42}}))
        .with_layer(
            "invalid_index",
            json!({
                "paramQ": ["valA", "valB"],
                "paramR": {"_ref": "paramQ.paramQA"}
            }),
        )
        .with_layer(
            "index_out_of_range",
            json!({
                "paramQ": ["valA", "valB"],
                "paramR": {"_ref": "paramQ.2"}
            }),
        )
}

/// Helper to create a processor with the fixture loader registered as `test`.
fn setup_processor() -> Processor {
    let mut loaders: HashMap<String, Arc<dyn appconf::config::Loader>> = HashMap::new();
    loaders.insert("test".to_string(), Arc::new(fixture_layers()));
    Processor::new(ProcessorConfig {
        loaders,
        ..Default::default()
    })
}

fn load(processor: &Processor, locators: &[Node]) -> Value {
    Value::Object(processor.load(locators).expect("load failed"))
}

#[test]
fn load_merges_and_resolves_all_layers() {
    let processor = setup_processor();

    let config = load(
        &processor,
        &[
            json!({
                "paramA": "default:valA",
                "paramZ": "default:valZ"
            }),
            json!("test:foo"),
            json!("test:bar"),
        ],
    );

    let expected = json!({
        "paramA": "foo:valA",
        "paramB": "bar:valB",
        "paramC": "bar:valC",

        "paramD": {
            "paramDA": "foo:valDA",
            "paramDB": "bar:valDB",
            "paramDC": "bar:valDC",
            "paramDE": "foo:bar:valDC",

            "paramDF": [
                "foo:valDFA",
                "foo:valDFB",
                "foo:foo:valDA"
            ]
        },

        "paramE": ["bar:valEA", "bar:valEB"],

        "paramF": "foo:bar:valB",
        "paramG": "bar:foo:valDA",
        "paramH": "foo:bar:valEA",
        "paramI": "bar:foo:bar:valEA",
        "paramJ": "foo:bar:foo:bar:valEA",
        "paramK": "bar:foo:valDFB:foo:bar:valDC",
        "paramL": "foo:${paramD.paramDE}:${}:${paramD.paramDA}",

        "paramM": {
            "paramDA": "foo:valDA",
            "paramDB": "bar:valDB",
            "paramDC": "bar:valDC",
            "paramDE": "foo:bar:valDC",

            "paramDF": [
                "foo:valDFA",
                "foo:valDFB",
                "foo:foo:valDA"
            ]
        },

        "paramN": {
            "paramNA": "foo:valNA",
            "paramNB": "foo:valNB",

            "paramNC": {
                "paramNCA": "foo:valNCA",
                "paramNCB": "bar:valNCB",
                "paramNCC": "bar:valNCC",
                "paramNCD": "bar:foo:valNCA",
                "paramNCE": "foo:valNB"
            }
        },

        "paramO": {
            "paramOA": "moo:valOA",
            "paramOB": "jar:valOB",
            "paramOC": "jar:valOC",

            "paramOD": {
                "paramODA": "moo:valODA",
                "paramODB": "jar:valODB",
                "paramODC": "jar:valODC",
                "paramODD": "jar:bar:valNCB"
            },

            "paramOE": ["zoo:valA", "zoo:valB"]
        },

        "paramP": {
            "paramODA": "moo:valODA",
            "paramODB": "jar:valODB",
            "paramODC": "jar:valODC",
            "paramODD": "jar:bar:valNCB"
        },

        "paramS": "bar:valS",
        "paramT": "bar:valY",
        "paramY": "bar:valY",
        "paramZ": "default:valZ"
    });

    assert_eq!(config, expected);
}

#[test]
fn load_is_repeatable_on_shared_processor() {
    let processor = Arc::new(setup_processor());
    let locators = vec![json!("test:foo"), json!("test:bar")];
    let first = load(&processor, &locators);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let processor = Arc::clone(&processor);
            let locators = locators.clone();
            std::thread::spawn(move || load(&processor, &locators))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), first);
    }
}

#[test]
fn disable_processing_returns_merged_tree() {
    let mut processor = Processor::new(ProcessorConfig {
        disable_processing: true,
        ..Default::default()
    });
    processor.register_loader("test", fixture_layers());

    let config = load(&processor, &[json!("test:bar")]);
    assert_eq!(config["paramG"], json!("bar:${paramD.paramDA}"));
    assert_eq!(config["paramM"], json!({"_ref": "paramD"}));
}

#[test]
fn disable_processing_still_expands_includes() {
    let mut processor = Processor::new(ProcessorConfig {
        disable_processing: true,
        ..Default::default()
    });
    processor.register_loader("test", fixture_layers());

    let config = load(&processor, &[json!("test:jar")]);
    assert_eq!(config["paramOE"], json!(["zoo:valA", "zoo:valB"]));
    assert_eq!(
        config["paramOD"]["paramODD"],
        json!("jar:${paramN.paramNC.paramNCB}")
    );
}

#[test]
fn load_without_locators_fails() {
    let err = setup_processor().load(&[]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoLocators);
    assert!(err.to_string().contains("no configuration locators"));
}

#[test]
fn load_reports_locator_errors() {
    let processor = setup_processor();
    let cases = [
        (json!(""), ErrorCode::EmptyLocator, "empty configuration locator"),
        (
            json!(42),
            ErrorCode::LocatorTypeInvalid,
            "configuration locator must be of type",
        ),
        (json!("foo"), ErrorCode::MissingLoaderName, "missing loader name"),
        (json!("etcd:foo"), ErrorCode::LoaderNotFound, "loader not found"),
        (json!("test:zoo"), ErrorCode::InvalidConfigType, "has invalid type"),
    ];

    for (locator, code, message) in cases {
        let err = processor.load(&[locator.clone()]).unwrap_err();
        assert_eq!(err.code(), code, "locator {locator}: {err}");
        assert!(
            err.to_string().contains(message),
            "locator {locator}: unexpected message {err}"
        );
    }
}

#[test]
fn load_reports_directive_errors() {
    let processor = setup_processor();
    let cases = [
        (
            "test:invalid_ref",
            ErrorCode::InvalidRefDirective,
            "invalid _ref directive",
        ),
        (
            "test:invalid_ref_name",
            ErrorCode::ReferenceNameInvalidType,
            "reference name must be of type",
        ),
        (
            "test:invalid_ref_first_defined",
            ErrorCode::FirstDefinedListInvalidType,
            "firstDefined list must be of type",
        ),
        (
            "test:invalid_ref_first_defined_argument",
            ErrorCode::FirstDefinedArgumentInvalidType,
            "reference name in firstDefined",
        ),
        (
            "test:invalid_include",
            ErrorCode::InvalidIncludeDirective,
            "invalid _include directive",
        ),
        (
            "test:invalid_index",
            ErrorCode::InvalidSliceIndex,
            "invalid slice index",
        ),
        (
            "test:index_out_of_range",
            ErrorCode::IndexOutOfRange,
            "index out of range",
        ),
    ];

    for (locator, code, message) in cases {
        let err = processor.load(&[json!(locator)]).unwrap_err();
        assert_eq!(err.code(), code, "locator {locator}: {err}");
        assert!(
            err.to_string().contains(message),
            "locator {locator}: unexpected message {err}"
        );
    }
}

#[test]
fn unresolvable_reference_names_path_and_location() {
    let processor = setup_processor();
    let err = processor
        .load(&[json!({"client": {"port": "${server.port}"}})])
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ReferenceFailed);
    let message = err.to_string();
    assert!(message.contains("server.port"), "{message}");
    assert!(message.contains("client.port"), "{message}");
}

#[test]
fn later_literal_layer_overrides_loaded_layer() {
    let processor = setup_processor();
    let config = load(
        &processor,
        &[
            json!("test:moo"),
            json!({"paramOD": {"paramODA": "override"}, "paramOB": ["now", "a", "list"]}),
        ],
    );
    assert_eq!(
        config,
        json!({
            "paramOA": "moo:valOA",
            "paramOB": ["now", "a", "list"],
            "paramOD": {"paramODA": "override", "paramODB": "moo:valODB"}
        })
    );
}

#[test]
fn reference_defined_in_later_layer_resolves() {
    let processor = setup_processor();
    let config = load(
        &processor,
        &[
            json!({"greeting": "hello ${who.name}", "who": {"name": "early"}}),
            json!({"who": {"name": "late"}}),
        ],
    );
    assert_eq!(config["greeting"], json!("hello late"));
}
