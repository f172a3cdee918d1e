use cdmigrate_model::{collections, ChildRef, Node, NodeType, Polarity, SequentialAllocator, SourceGraph};
use cdmigrate_normalize::{migrate, MigrateError, MigrationReport, Notice};
use cdmigrate_storage::MemoryStore;
use serde_json::{json, Value};

fn claim(id: &str) -> Node {
    Node::new(id, NodeType::Claim)
}

fn argument(id: &str) -> Node {
    Node::new(id, NodeType::Argument)
}

fn with_child(mut node: Node, id: &str, polarity: Option<Polarity>) -> Node {
    node.add_child(ChildRef::new(id, polarity));
    node
}

fn run(nodes: Vec<Node>) -> (MemoryStore, MigrationReport) {
    let mut store = MemoryStore::new();
    let mut ids = SequentialAllocator::new("g");
    let report = migrate(SourceGraph::new(nodes), &mut store, &mut ids).expect("migration runs");
    (store, report)
}

fn by_id(store: &MemoryStore, collection: &str, id: &str) -> Value {
    let found = store.find_by(collection, "id", &json!(id));
    assert_eq!(found.len(), 1, "expected exactly one {collection} with id {id}");
    found.into_iter().next().unwrap()
}

fn handle(doc: &Value) -> String {
    doc["_id"].as_str().unwrap().to_string()
}

#[test]
fn claim_with_argument_child_gets_inference_and_linkage() {
    let a = with_child(claim("A"), "R", Some(Polarity::Pro));
    let r = with_child(argument("R"), "B", None);
    let (store, report) = run(vec![a, r, claim("B")]);

    let arg = by_id(&store, collections::ARGUMENTS, "R");
    assert_eq!(arg["pro"], true);
    assert_eq!(arg["targetClaimId"], "A");
    assert_eq!(arg["claimId"], "B");
    assert!(arg.get("targetArgId").is_none());

    let claim_a = by_id(&store, collections::CLAIMS, "A");
    let claim_b = by_id(&store, collections::CLAIMS, "B");
    let inferences = store.documents(collections::INFERENCES);
    assert_eq!(inferences.len(), 1);
    assert_eq!(inferences[0]["_from"], json!(handle(&claim_a)));
    assert_eq!(inferences[0]["_to"], json!(handle(&arg)));

    let base = store.documents(collections::BASE_CLAIMS);
    assert_eq!(base.len(), 1);
    assert_eq!(base[0]["_from"], json!(handle(&arg)));
    assert_eq!(base[0]["_to"], json!(handle(&claim_b)));

    assert_eq!(report.argument_updates, 1);
    assert_eq!(report.repairs(), 0);
}

#[test]
fn claim_citing_claim_is_mediated_by_a_fresh_argument() {
    let mut x = claim("X");
    x.creator = "xavier".into();
    let a = with_child(claim("A"), "X", Some(Polarity::Pro));
    let (store, report) = run(vec![a, x]);

    let arguments = store.documents(collections::ARGUMENTS);
    assert_eq!(arguments.len(), 1);
    let s = &arguments[0];
    assert_ne!(s["id"], "X", "synthetic argument must not reuse the child id");
    assert_eq!(s["pro"], true);
    assert_eq!(s["targetClaimId"], "A");
    assert_eq!(s["claimId"], "X");
    assert_eq!(s["creator"], "xavier");

    let claim_a = by_id(&store, collections::CLAIMS, "A");
    let claim_x = by_id(&store, collections::CLAIMS, "X");
    let inferences = store.documents(collections::INFERENCES);
    assert_eq!(inferences.len(), 1);
    assert_eq!(inferences[0]["_from"], json!(handle(&claim_a)));
    assert_eq!(inferences[0]["_to"], json!(handle(s)));
    let base = store.documents(collections::BASE_CLAIMS);
    assert_eq!(base.len(), 1);
    assert_eq!(base[0]["_from"], json!(handle(s)));
    assert_eq!(base[0]["_to"], json!(handle(&claim_x)));

    assert_eq!(report.repairs(), 1);
    assert!(report
        .notices
        .iter()
        .any(|n| matches!(n, Notice::ClaimCitesClaim { parent, child, .. } if parent == "A" && child == "X")));
}

#[test]
fn con_citation_yields_con_argument() {
    let a = with_child(claim("A"), "X", Some(Polarity::Con));
    let (store, _) = run(vec![a, claim("X")]);
    assert_eq!(store.documents(collections::ARGUMENTS)[0]["pro"], false);
}

#[test]
fn argument_under_argument_targets_the_parent_argument() {
    let a = with_child(claim("A"), "R", Some(Polarity::Pro));
    let r = with_child(with_child(argument("R"), "B", None), "U", Some(Polarity::Con));
    let u = with_child(argument("U"), "C", None);
    let (store, _) = run(vec![a, r, u, claim("B"), claim("C")]);

    let undercut = by_id(&store, collections::ARGUMENTS, "U");
    assert_eq!(undercut["targetArgId"], "R");
    assert_eq!(undercut["pro"], false);
    assert!(undercut.get("targetClaimId").is_none());

    let r_doc = by_id(&store, collections::ARGUMENTS, "R");
    let from_r = store.find_by(collections::INFERENCES, "_from", &json!(handle(&r_doc)));
    assert_eq!(from_r.len(), 1);
    assert_eq!(from_r[0]["_to"], json!(handle(&undercut)));
}

#[test]
fn child_polarity_falls_back_to_the_child_node() {
    let a = with_child(claim("A"), "R", None);
    let mut r = with_child(argument("R"), "B", None);
    r.polarity = Some(Polarity::Pro);
    let (store, _) = run(vec![a, r, claim("B")]);
    assert_eq!(by_id(&store, collections::ARGUMENTS, "R")["pro"], true);
}

#[test]
fn multi_premise_argument_emits_ordered_premises() {
    let parent = with_child(claim("T"), "M", Some(Polarity::Pro));
    let mut m = with_child(with_child(argument("M"), "p1", None), "p2", None);
    m.multi_premise = true;
    m.parents.insert("T".into());
    m.children_order = vec!["p2".into(), "p1".into()];
    let (store, report) = run(vec![parent, m, claim("p1"), claim("p2")]);

    let mp_claims = store.find_by(collections::CLAIMS, "mp", &json!(true));
    assert_eq!(mp_claims.len(), 1);
    let mp = &mp_claims[0];
    assert_eq!(mp["childrenOrder"], json!(["p2", "p1"]));

    let p1 = by_id(&store, collections::CLAIMS, "p1");
    let p2 = by_id(&store, collections::CLAIMS, "p2");
    let premises = store.find_by(collections::PREMISES, "_from", &json!(handle(mp)));
    assert_eq!(premises.len(), 2);
    let order_of = |target: &Value| {
        premises
            .iter()
            .find(|p| p["_to"] == json!(handle(target)))
            .map(|p| p["order"].clone())
            .unwrap()
    };
    assert_eq!(order_of(&p1), json!(2));
    assert_eq!(order_of(&p2), json!(1));

    // M keeps its place under T and is based on the new multi-premise claim.
    let m_doc = by_id(&store, collections::ARGUMENTS, "M");
    assert_eq!(m_doc["targetClaimId"], "T");
    assert_eq!(m_doc["claimId"], mp["id"]);
    assert_eq!(report.premises, 2);
    assert_eq!(report.repairs(), 0);
}

#[test]
fn premise_absent_from_order_gets_order_zero() {
    let mut m = with_child(with_child(argument("M"), "p1", None), "p3", None);
    m.multi_premise = true;
    m.children_order = vec!["p1".into()];
    let (store, _) = run(vec![m, claim("p1"), claim("p3")]);

    let p3 = by_id(&store, collections::CLAIMS, "p3");
    let to_p3 = store.find_by(collections::PREMISES, "_to", &json!(handle(&p3)));
    assert_eq!(to_p3.len(), 1);
    assert_eq!(to_p3[0]["order"], 0);
}

#[test]
fn inferring_argument_without_claim_child_gets_a_synthesized_claim() {
    let a = with_child(claim("A"), "R", Some(Polarity::Pro));
    let mut r = argument("R");
    r.titles.base = "Costs fall over time".into();
    let (store, report) = run(vec![a, r]);

    let r_doc = by_id(&store, collections::ARGUMENTS, "R");
    let base = store.find_by(collections::BASE_CLAIMS, "_from", &json!(handle(&r_doc)));
    assert_eq!(base.len(), 1);
    let synthesized = store
        .documents(collections::CLAIMS)
        .into_iter()
        .find(|c| c["_id"] == base[0]["_to"])
        .unwrap();
    assert_eq!(synthesized["title"], "Costs fall over time");
    assert_eq!(r_doc["claimId"], synthesized["id"]);
    assert!(report
        .notices
        .iter()
        .any(|n| matches!(n, Notice::DanglingArgumentRepaired { argument, .. } if argument == "R")));
}

#[test]
fn second_parent_keeps_first_linkage_but_still_infers() {
    let a = with_child(claim("A"), "R", Some(Polarity::Pro));
    let b = with_child(claim("B"), "R", Some(Polarity::Con));
    let r = with_child(argument("R"), "C", None);
    let (store, report) = run(vec![a, b, r, claim("C")]);

    let r_doc = by_id(&store, collections::ARGUMENTS, "R");
    assert_eq!(r_doc["targetClaimId"], "A");
    assert_eq!(r_doc["pro"], true);
    assert_eq!(store.len(collections::INFERENCES), 2);
    assert!(report.notices.iter().any(
        |n| matches!(n, Notice::Relinked { argument, kept, ignored } if argument == "R" && kept == "A" && ignored == "B")
    ));
}

#[test]
fn second_claim_child_writes_no_second_base_claim() {
    let a = with_child(claim("A"), "R", Some(Polarity::Pro));
    let r = with_child(with_child(argument("R"), "C1", None), "C2", None);
    let (store, report) = run(vec![a, r, claim("C1"), claim("C2")]);

    assert_eq!(store.len(collections::BASE_CLAIMS), 1);
    assert_eq!(by_id(&store, collections::ARGUMENTS, "R")["claimId"], "C1");
    assert!(report
        .notices
        .iter()
        .any(|n| matches!(n, Notice::ExtraBaseClaim { ignored, .. } if ignored == "C2")));
}

#[test]
fn each_argument_is_updated_once() {
    let a = with_child(claim("A"), "R", Some(Polarity::Pro));
    let r = with_child(with_child(argument("R"), "B", None), "U", Some(Polarity::Con));
    let u = with_child(argument("U"), "C", None);
    let (store, report) = run(vec![a, r, u, claim("B"), claim("C")]);

    assert_eq!(report.argument_updates, 2);
    let vertex_writes = (report.claims + report.arguments) as u64;
    let edge_writes = report.edges() as u64;
    assert_eq!(
        store.writes(),
        vertex_writes + edge_writes + report.argument_updates as u64
    );
}

#[test]
fn leaf_nodes_are_reported_and_unlinked_arguments_flagged() {
    let r = with_child(argument("R"), "B", None);
    let (_, report) = run(vec![r, claim("B")]);
    assert!(report
        .notices
        .iter()
        .any(|n| matches!(n, Notice::NoChildren { node, .. } if node == "B")));
    assert!(report
        .notices
        .iter()
        .any(|n| matches!(n, Notice::UnlinkedArgument { argument } if argument == "R")));
}

#[test]
fn unknown_child_is_fatal() {
    let a = with_child(claim("A"), "ghost", Some(Polarity::Pro));
    let mut store = MemoryStore::new();
    let err = migrate(
        SourceGraph::new(vec![a]),
        &mut store,
        &mut SequentialAllocator::new("g"),
    )
    .unwrap_err();
    assert!(matches!(err, MigrateError::ChildNotFound { parent, child } if parent == "A" && child == "ghost"));
}

#[test]
fn unknown_child_of_argument_is_fatal() {
    let r = with_child(argument("R"), "ghost", None);
    let mut store = MemoryStore::new();
    let err = migrate(
        SourceGraph::new(vec![r]),
        &mut store,
        &mut SequentialAllocator::new("g"),
    )
    .unwrap_err();
    assert!(matches!(err, MigrateError::ChildNotFound { .. }));
}

#[test]
fn argument_as_premise_is_fatal() {
    let mut m = with_child(argument("M"), "R", None);
    m.multi_premise = true;
    let r = with_child(argument("R"), "B", None);
    let mut store = MemoryStore::new();
    let err = migrate(
        SourceGraph::new(vec![m, r, claim("B")]),
        &mut store,
        &mut SequentialAllocator::new("g"),
    )
    .unwrap_err();
    assert!(matches!(err, MigrateError::PremiseNotFound { child, .. } if child == "R"));
}

#[test]
fn placeholders_round_trip_as_claims_and_arguments() {
    let mut root = with_child(Node::new("Root", NodeType::Category), "Q", None);
    root.titles.base = "Root category".into();
    let mut q = with_child(Node::new("Q", NodeType::Question), "C", Some(Polarity::Pro));
    q.parents.insert("Root".into());
    q.titles.base = "Should we?".into();
    let mut graph = SourceGraph::new(vec![root, q, claim("C")]);
    graph.map_names.insert("Root".into(), "Energy map".into());

    let mut store = MemoryStore::new();
    let report = migrate(graph, &mut store, &mut SequentialAllocator::new("g")).unwrap();

    let root_claim = by_id(&store, collections::CLAIMS, "Root");
    assert_eq!(root_claim["title"], "Energy map");

    let q_arg = by_id(&store, collections::ARGUMENTS, "Q");
    assert_eq!(q_arg["targetClaimId"], "Root");
    let q_claim = store
        .documents(collections::CLAIMS)
        .into_iter()
        .find(|c| c["title"] == "Should we?")
        .unwrap();
    assert_eq!(q_arg["claimId"], q_claim["id"]);

    // Q's claim cites C directly, which needs a mediating argument.
    assert_eq!(report.repairs(), 1);
    assert_eq!(store.len(collections::ARGUMENTS), 2);
    assert_eq!(store.len(collections::INFERENCES), 2);
    assert_eq!(store.len(collections::BASE_CLAIMS), 2);
}

#[test]
fn rerun_truncates_previous_output() {
    let nodes = vec![with_child(claim("A"), "X", Some(Polarity::Pro)), claim("X")];
    let mut store = MemoryStore::new();
    migrate(SourceGraph::new(nodes.clone()), &mut store, &mut SequentialAllocator::new("g")).unwrap();
    migrate(SourceGraph::new(nodes), &mut store, &mut SequentialAllocator::new("g")).unwrap();
    assert_eq!(store.len(collections::CLAIMS), 2);
    assert_eq!(store.len(collections::ARGUMENTS), 1);
    assert_eq!(store.len(collections::INFERENCES), 1);
}

#[test]
fn split_claim_stays_base_claim_whatever_its_fresh_id() {
    // `k` sorts between the "a-" and "z-" ids of the split claim.
    for prefix in ["a", "z"] {
        let t = with_child(claim("T"), "M", Some(Polarity::Pro));
        let mut m = with_child(
            with_child(argument("M"), "p1", None),
            "k",
            Some(Polarity::Pro),
        );
        m.multi_premise = true;
        let nodes = vec![t, m, claim("p1"), claim("k")];

        let mut store = MemoryStore::new();
        let report = migrate(
            SourceGraph::new(nodes),
            &mut store,
            &mut SequentialAllocator::new(prefix),
        )
        .expect("migration runs");

        let mp = &store.find_by(collections::CLAIMS, "mp", &json!(true))[0];
        let m_doc = by_id(&store, collections::ARGUMENTS, "M");
        assert_eq!(m_doc["claimId"], mp["id"], "prefix {prefix}");
        let base = store.find_by(collections::BASE_CLAIMS, "_from", &json!(handle(&m_doc)));
        assert_eq!(base.len(), 1, "prefix {prefix}");
        assert_eq!(base[0]["_to"], json!(handle(mp)), "prefix {prefix}");
        assert!(
            report
                .notices
                .iter()
                .any(|n| matches!(n, Notice::ExtraBaseClaim { ignored, .. } if ignored == "k")),
            "prefix {prefix}"
        );
    }
}
