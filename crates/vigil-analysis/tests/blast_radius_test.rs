//! Blast radius traversal and changed-entity resolution.

mod common;

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use proptest::prelude::*;
use vigil_analysis::checks::{CheckContext, CheckEngine};
use vigil_analysis::graph::{compute_blast_radius, compute_entity_blast_radius, resolve_changed_entities};
use vigil_core::config::{BlastRadiusConfig, ReviewConfig};
use vigil_core::traits::CancellationToken;
use vigil_core::types::*;

use common::*;

#[test]
fn test_twelve_transitive_callers_with_route_at_depth_two() {
    let s = store();
    let target = entity(EntityKind::Function, "chargeCard", "src/billing/charge.ts", 10, 30);
    let direct: Vec<Entity> = (1..=6).map(|i| func(&format!("c{i}"), "src/billing/callers.ts")).collect();
    let route = entity(EntityKind::ApiRoute, "POST /checkout", "src/routes/checkout.ts", 1, 40);
    let second: Vec<Entity> = (2..=6).map(|i| func(&format!("d{i}"), "src/jobs/batch.ts")).collect();

    let mut all = vec![target.clone(), route.clone()];
    all.extend(direct.iter().cloned());
    all.extend(second.iter().cloned());
    let mut calls: Vec<(&Entity, &Entity)> = direct.iter().map(|c| (c, &target)).collect();
    calls.push((&route, &direct[0]));
    for (i, d) in second.iter().enumerate() {
        calls.push((d, &direct[i + 1]));
    }
    seed(&s, &all, &calls);

    let changes = ChangeSet::new(vec![changed("src/billing/charge.ts", &[(15, "  const fee = amount * 0.03;")])]);
    let entities = resolve_changed_entities(s.as_ref(), ORG, REPO, &changes).unwrap();
    assert_eq!(entities.len(), 1);
    let config = BlastRadiusConfig::default();
    let summaries = compute_blast_radius(s.as_ref(), ORG, &entities, &config).unwrap();
    assert_eq!(summaries[0].caller_count, 12);
    assert_eq!(summaries[0].max_depth_reached, 2);

    let review = ReviewConfig::default();
    let cancel = CancellationToken::new();
    let api_kinds = config.effective_api_boundary_kinds();
    let ctx = CheckContext {
        org_id: ORG,
        repo_id: REPO,
        entities: &entities,
        summaries: &summaries,
        config: &review,
        changes: &changes,
        store: s.as_ref(),
        rules: &[],
        matcher: None,
        workspace: None::<&Path>,
        api_boundary_kinds: &api_kinds,
        cancel: &cancel,
    };
    let run = CheckEngine::new().run(&ctx);
    assert!(run.failures.is_empty());

    let impact = run.findings.get(CheckKind::Impact);
    assert_eq!(impact.len(), 1);
    let Finding::Impact(f) = &impact[0] else { panic!("expected impact finding") };
    assert_eq!(f.caller_count, 12);
    assert_eq!(f.top_callers.len(), 5);
    assert_eq!(f.top_callers[0].name, "c1");
    assert_eq!(f.severity, Severity::Medium);

    let contract = run.findings.get(CheckKind::Contract);
    assert_eq!(contract.len(), 1);
    let Finding::Contract(c) = &contract[0] else { panic!("expected contract finding") };
    assert_eq!(c.severity, Severity::High);
    assert_eq!(c.depth, 2);
    assert_eq!(c.boundary_name, "POST /checkout");
}

#[test]
fn test_boundary_records_minimum_depth() {
    let s = store();
    let t = func("t", "src/t.ts");
    let a = func("a", "src/a.ts");
    let b = func("b", "src/b.ts");
    let route = entity(EntityKind::ApiRoute, "GET /items", "src/routes.ts", 1, 10);
    seed(
        &s,
        &[t.clone(), a.clone(), b.clone(), route.clone()],
        &[(&a, &t), (&b, &a), (&route, &b), (&route, &t)],
    );

    let summary = compute_entity_blast_radius(s.as_ref(), ORG, &t, 5, &[EntityKind::ApiRoute]).unwrap();
    assert_eq!(summary.caller_count, 3);
    assert_eq!(summary.upstream_boundaries.len(), 1);
    assert_eq!(summary.upstream_boundaries[0].depth, 1);
    assert_eq!(summary.nearest_boundary().unwrap().entity.name, "GET /items");
}

#[test]
fn test_depth_bound_stops_traversal() {
    let s = store();
    let chain: Vec<Entity> = (0..8).map(|i| func(&format!("n{i}"), "src/chain.ts")).collect();
    let calls: Vec<(&Entity, &Entity)> = chain.windows(2).map(|w| (&w[1], &w[0])).collect();
    seed(&s, &chain, &calls);

    let summary = compute_entity_blast_radius(s.as_ref(), ORG, &chain[0], 3, &[]).unwrap();
    assert_eq!(summary.caller_count, 3);
    assert_eq!(summary.max_depth_reached, 3);

    let none = compute_entity_blast_radius(s.as_ref(), ORG, &chain[7], 3, &[]).unwrap();
    assert_eq!(none.caller_count, 0);
    assert_eq!(none.max_depth_reached, 0);
}

#[test]
fn test_cycle_terminates() {
    let s = store();
    let a = func("a", "src/a.ts");
    let b = func("b", "src/b.ts");
    let c = func("c", "src/c.ts");
    seed(&s, &[a.clone(), b.clone(), c.clone()], &[(&b, &a), (&c, &b), (&a, &c)]);

    let summary = compute_entity_blast_radius(s.as_ref(), ORG, &a, 50, &[]).unwrap();
    assert_eq!(summary.caller_count, 2);
}

#[test]
fn test_resolution_skips_files_removed_and_untouched() {
    let s = store();
    let file = entity(EntityKind::File, "cart.ts", "src/cart.ts", 1, 200);
    let add = entity(EntityKind::Function, "addItem", "src/cart.ts", 10, 30);
    let total = entity(EntityKind::Function, "total", "src/cart.ts", 40, 60);
    let gone = entity(EntityKind::Function, "legacy", "src/old.ts", 1, 50);
    seed(&s, &[file, add.clone(), total, gone], &[]);

    let mut removed = changed("src/old.ts", &[]);
    removed.status = FileStatus::Removed;
    removed.removed_lines = vec![DiffLine::new(5, "legacy()")];
    let mut cart = changed("src/cart.ts", &[(12, "items.push(item);")]);
    cart.removed_lines = vec![DiffLine::new(25, "items.add(item);")];
    let changes = ChangeSet::new(vec![cart, removed]);

    let entities = resolve_changed_entities(s.as_ref(), ORG, REPO, &changes).unwrap();
    let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["addItem"]);
    assert_eq!(entities[0].id, add.id);
}

/// Reference traversal over an in-memory adjacency list.
fn naive_callers(edges: &[(usize, usize)], start: usize) -> usize {
    let mut callers: HashMap<usize, Vec<usize>> = HashMap::new();
    for (caller, callee) in edges {
        callers.entry(*callee).or_default().push(*caller);
    }
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(n) = queue.pop_front() {
        for c in callers.get(&n).into_iter().flatten() {
            if seen.insert(*c) {
                queue.push_back(*c);
            }
        }
    }
    seen.len() - 1
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_caller_count_matches_reference_bfs(
        n in 2usize..16,
        raw_edges in proptest::collection::vec((0usize..16, 0usize..16), 0..48),
    ) {
        let edges: Vec<(usize, usize)> = raw_edges
            .into_iter()
            .map(|(a, b)| (a % n, b % n))
            .filter(|(a, b)| a != b)
            .collect();
        let s = store();
        let nodes: Vec<Entity> = (0..n).map(|i| func(&format!("n{i}"), "src/g.ts")).collect();
        let calls: Vec<(&Entity, &Entity)> = edges.iter().map(|(a, b)| (&nodes[*a], &nodes[*b])).collect();
        seed(&s, &nodes, &calls);

        // Depth n covers every simple path, so the bound never cuts early.
        let summary = compute_entity_blast_radius(s.as_ref(), ORG, &nodes[0], n as u32, &[]).unwrap();
        prop_assert_eq!(summary.caller_count as usize, naive_callers(&edges, 0));
        prop_assert!(summary.max_depth_reached <= n as u32);
    }
}
