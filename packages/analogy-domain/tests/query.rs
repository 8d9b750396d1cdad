use serde_json::{Value, json};

use analogy_domain::{
	knowledge::KnowledgeMode,
	query::{ProviderFilter, QueryContext, QueryError, Triplet},
};

fn one_hop_body(knowledge_type: Option<&str>) -> Value {
	let mut edge = json!({
		"subject": "n0",
		"object": "n1",
		"predicates": ["biolink:treats", "biolink:related_to"],
		"attribute_constraints": [{ "id": "biolink:p_value", "operator": "<", "value": 0.05 }]
	});

	if let Some(knowledge_type) = knowledge_type {
		edge["knowledge_type"] = Value::String(knowledge_type.to_string());
	}

	json!({
		"message": {
			"query_graph": {
				"nodes": {
					"n0": { "categories": ["biolink:SmallMolecule", "biolink:ChemicalEntity"] },
					"n1": { "categories": ["biolink:Disease"], "ids": ["MONDO:0005148"] }
				},
				"edges": { "e0": edge }
			}
		}
	})
}

#[test]
fn extracts_metadata_from_first_edge() {
	let context =
		QueryContext::from_request(&one_hop_body(Some("inferred"))).expect("Query must be valid.");

	assert_eq!(context.primary_edge_id, "e0");
	assert_eq!(context.subject_categories, ["biolink:SmallMolecule", "biolink:ChemicalEntity"]);
	assert_eq!(context.object_categories, ["biolink:Disease"]);
	assert_eq!(context.predicates[0], "biolink:treats");
	assert_eq!(context.object_ids.as_deref(), Some(&["MONDO:0005148".to_string()][..]));
	assert!(context.subject_ids.is_none());
	assert_eq!(context.attribute_constraints.as_ref().map(Vec::len), Some(1));
	assert_eq!(context.knowledge_mode, KnowledgeMode::Creative);
	assert!(context.is_one_hop);
	assert!(context.has_creative_edge());
	assert_eq!(context.provider_filter, ProviderFilter::Unrestricted);
}

#[test]
fn knowledge_mode_defaults_to_lookup() {
	let context = QueryContext::from_request(&one_hop_body(None)).expect("Query must be valid.");

	assert_eq!(context.knowledge_mode, KnowledgeMode::Lookup);
	assert!(!context.has_creative_edge());
}

#[test]
fn missing_query_graph_is_a_configuration_error() {
	let err = QueryContext::from_request(&json!({ "message": {} }))
		.expect_err("Missing query graph must fail.");

	assert!(matches!(err, QueryError::MissingQueryGraph));
}

#[test]
fn missing_edge_is_a_configuration_error() {
	let body = json!({
		"message": { "query_graph": { "nodes": { "n0": { "categories": ["biolink:Gene"] } }, "edges": {} } }
	});
	let err = QueryContext::from_request(&body).expect_err("Missing edge must fail.");

	assert!(matches!(err, QueryError::MissingEdges));
}

#[test]
fn dangling_node_reference_is_a_configuration_error() {
	let mut body = one_hop_body(None);

	body["message"]["query_graph"]["edges"]["e0"]["object"] = Value::String("n9".to_string());

	let err = QueryContext::from_request(&body).expect_err("Unknown node must fail.");

	assert!(matches!(err, QueryError::UnknownNode { ref node, .. } if node == "n9"));
}

#[test]
fn empty_categories_are_a_configuration_error() {
	let mut body = one_hop_body(None);

	body["message"]["query_graph"]["nodes"]["n1"]["categories"] = json!([]);

	let err = QueryContext::from_request(&body).expect_err("Empty categories must fail.");

	assert!(matches!(err, QueryError::MissingCategories { ref node } if node == "n1"));
}

#[test]
fn fill_workflow_supplies_deny_list() {
	let mut body = one_hop_body(None);

	body["workflow"] = json!([
		{ "id": "lookup" },
		{ "id": "fill", "parameters": { "denylist": ["kp-x"] } }
	]);

	let context = QueryContext::from_request(&body).expect("Query must be valid.");

	assert_eq!(context.provider_filter, ProviderFilter::Deny(vec!["kp-x".to_string()]));
	assert!(!context.provider_filter.admits("kp-x"));
	assert!(context.provider_filter.admits("kp-y"));
}

#[test]
fn allow_list_takes_precedence_over_deny_list() {
	let filter = ProviderFilter::from_lists(
		Some(vec!["kp-a".to_string()]),
		Some(vec!["kp-a".to_string(), "kp-b".to_string()]),
	);

	assert_eq!(filter, ProviderFilter::Allow(vec!["kp-a".to_string()]));
	assert!(filter.admits("kp-a"));
	assert!(!filter.admits("kp-c"));
}

#[test]
fn triplet_exposes_primary_categories_and_predicate() {
	let context =
		QueryContext::from_request(&one_hop_body(Some("lookup"))).expect("Query must be valid.");
	let triplet = Triplet::from_edge(&context.graph, "e0").expect("e0 must exist.");

	assert_eq!(triplet.source_category().expect("Source category."), "biolink:SmallMolecule");
	assert_eq!(triplet.target_category().expect("Target category."), "biolink:Disease");
	assert_eq!(triplet.primary_predicate().expect("Predicate."), "biolink:treats");
	assert_eq!(triplet.knowledge_mode(), KnowledgeMode::Lookup);
	assert_eq!(triplet.to_string(), "n0-[e0]->n1");
}
