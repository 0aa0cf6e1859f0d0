//! End-to-end checks of parsing plus aggregation on claim-shaped input.

use claim::prelude::*;
use serde_json::json;

fn certsuite_claim() -> String {
    json!({
        "claim": {
            "configurations": {},
            "nodes": {},
            "results": {
                "access-control-bpf-capability-check": {
                    "testID": {
                        "id": "access-control-bpf-capability-check",
                        "suite": "access-control",
                        "tags": "telco"
                    },
                    "state": "passed",
                    "capturedTestOutput": "INFO ok\nall good",
                    "categoryClassification": {
                        "Extended": "false", "FarEdge": "false",
                        "NonTelco": "false", "Telco": "true"
                    },
                    "catalogInfo": {
                        "description": "Ensures that containers do not use BPF capability.",
                        "exceptionProcess": "Exception can be considered.",
                        "remediation": "Remove the BPF capability.",
                        "bestPracticeReference": "https://example.com/bpf"
                    }
                },
                "lifecycle-pod-owner-type": {
                    "testID": {
                        "id": "lifecycle-pod-owner-type",
                        "suite": "lifecycle",
                        "tags": "common,mandatory"
                    },
                    "state": "failed",
                    "capturedTestOutput": "pod default/p has no owner",
                    "categoryClassification": {
                        "Extended": "true", "FarEdge": "true",
                        "NonTelco": "true", "Telco": "true"
                    },
                    "catalogInfo": {
                        "description": "Tests that pods are deployed as part of a ReplicaSet.",
                        "exceptionProcess": "There is no documented exception process for this.",
                        "remediation": "Deploy pods as part of a ReplicaSet.",
                        "bestPracticeReference": "https://example.com/owner"
                    }
                },
                "observability-crd-status": {
                    "testID": {
                        "id": "observability-crd-status",
                        "suite": "observability",
                        "tags": "common,optional"
                    },
                    "state": "skipped",
                    "categoryClassification": {
                        "Extended": false, "FarEdge": false,
                        "NonTelco": true, "Telco": false
                    },
                    "catalogInfo": {
                        "description": "Checks that CRDs have a status subresource.",
                        "exceptionProcess": "No exceptions",
                        "remediation": "Add a status subresource.",
                        "bestPracticeReference": ""
                    }
                },
                "networking-icmp-v4-connectivity": {
                    "testID": {
                        "id": "networking-icmp-v4-connectivity",
                        "suite": "networking",
                        "tags": "common"
                    },
                    "state": "Error",
                    "categoryClassification": {
                        "Extended": "false", "FarEdge": "true",
                        "NonTelco": "false", "Telco": "false"
                    },
                    "catalogInfo": {
                        "description": "Checks ICMP connectivity.",
                        "exceptionProcess": "Best practice only.",
                        "remediation": "Fix networking.",
                        "bestPracticeReference": ""
                    }
                }
            },
            "versions": {
                "certSuite": "v5.1.0",
                "certSuiteGitCommit": "abc123",
                "claimFormat": "v0.4.0",
                "k8s": "v1.27.6",
                "ocClient": "4.14.2",
                "ocp": "4.14.2"
            }
        }
    })
    .to_string()
}

#[test]
fn test_totals_are_consistent() {
    let doc = parse_claim(&certsuite_claim()).unwrap();
    let summary = ReportSummary::build(&doc, &ReportConfig::default());

    let o = summary.overall;
    assert_eq!(o.total, 4);
    assert_eq!(o.passed + o.failed + o.error + o.skipped + o.unknown, o.total);
    assert_eq!(summary.suite_total(), o.total);
    assert_eq!(summary.suites.len(), 4);
}

#[test]
fn test_requirements_follow_rule_chain() {
    let doc = parse_claim(&certsuite_claim()).unwrap();
    let summary = ReportSummary::build(&doc, &ReportConfig::default());

    let requirement = |id: &str| {
        summary
            .tests
            .iter()
            .find(|t| t.result.id == id)
            .map(|t| t.requirement)
            .unwrap()
    };

    assert_eq!(requirement("lifecycle-pod-owner-type"), Requirement::Mandatory);
    assert_eq!(requirement("observability-crd-status"), Requirement::Optional);
    assert_eq!(requirement("networking-icmp-v4-connectivity"), Requirement::Optional);
    assert_eq!(requirement("access-control-bpf-capability-check"), Requirement::Mandatory);
}

#[test]
fn test_category_breakdown() {
    let doc = parse_claim(&certsuite_claim()).unwrap();
    let summary = ReportSummary::build(&doc, &ReportConfig::default());

    let telco = summary.category("Telco").unwrap();
    assert_eq!((telco.total, telco.mandatory, telco.optional), (1, 1, 0));

    let non_telco = summary.category("Non-Telco").unwrap();
    assert_eq!((non_telco.total, non_telco.mandatory, non_telco.optional), (1, 0, 1));

    let far_edge = summary.category("Far-Edge").unwrap();
    assert_eq!((far_edge.total, far_edge.optional), (1, 1));

    // The all-categories test never lands in a "specific tests only" bucket.
    assert_eq!(summary.category("Extended").unwrap().total, 0);
}

#[test]
fn test_every_status_is_normalized() {
    let doc = parse_claim(&certsuite_claim()).unwrap();
    for result in doc.results.values() {
        assert!(TestStatus::ALL.contains(&result.status));
        assert!(!result.status.as_str().is_empty());
    }
    assert_eq!(
        doc.results["networking-icmp-v4-connectivity"].status,
        TestStatus::Error
    );
}

#[test]
fn test_config_file_changes_suite_rule() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("claimsheet.toml");
    std::fs::write(
        &path,
        "[suites]\nprefer_declared = false\nknown_prefixes = []\n",
    )
    .unwrap();

    let config = ReportConfig::from_path(&path).unwrap();
    let doc = parse_claim(&certsuite_claim()).unwrap();
    let summary = ReportSummary::build(&doc, &config);

    let suites: Vec<&str> = summary.suites.keys().map(String::as_str).collect();
    assert_eq!(suites, vec!["access", "lifecycle", "networking", "observability"]);
}
