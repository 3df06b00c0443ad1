use fog_pathfinding::algorithms::{AStar, Dijkstra, Phase, SearchEngine, StepPhase, Strategy, INFINITE};
use fog_pathfinding::error::SearchError;
use fog_pathfinding::grid::{Grid, NodeId, ParsedMap};

fn parse(map: &str) -> (Grid, NodeId, NodeId) {
    let ParsedMap { grid, start, target } = Grid::from_ascii(map).unwrap();
    (grid, start.unwrap(), target.unwrap())
}

#[test]
fn test_straight_corridor() {
    // A B C D
    let (grid, start, target) = parse("S..G");
    let mut search = AStar::a_star(&grid);
    search.prepare(start, target).unwrap();

    assert!(search.find_shortest_path().unwrap());
    assert_eq!(search.cost(target), 3);
    assert_eq!(search.heuristic_of(start), 3);
    assert_eq!(search.node_cost(target).f(), 3);
    assert_eq!(search.get_path(start, target).unwrap(), vec![0, 1, 2, 3]);

    let forest = search.find_alternative_paths().unwrap();
    assert_eq!(forest.count, 1);
    assert_eq!(forest.paths, vec![vec![0, 1, 2, 3]]);
    assert_eq!(forest.cost, 3);
    assert_eq!(search.phase(), Phase::AlternativesExpanded);
}

#[test]
fn test_diamond_has_two_tied_paths() {
    // A B
    // C D
    let (grid, start, target) = parse(
        "S.
         .G",
    );
    let mut search = AStar::a_star(&grid);
    search.prepare(start, target).unwrap();
    assert!(search.find_shortest_path().unwrap());

    let forest = search.find_alternative_paths().unwrap();
    assert_eq!(forest.count, 2);
    assert_eq!((forest.min_len, forest.max_len), (3, 3));
    assert!(forest.paths.contains(&vec![0, 1, 3]));
    assert!(forest.paths.contains(&vec![0, 2, 3]));
}

#[test]
fn test_alternatives_span_different_lengths() {
    // Straight through the forest (3 cells) or around it on street (5 cells),
    // both costing 4.
    let (grid, start, target) = parse(
        "SfG
         ...",
    );
    let mut search = Dijkstra::dijkstra(&grid);
    search.prepare(start, target).unwrap();
    assert!(search.find_shortest_path().unwrap());

    let forest = search.find_alternative_paths().unwrap();
    assert_eq!(forest.cost, 4);
    assert_eq!(forest.count, 2);
    assert!(forest.paths.contains(&vec![0, 1, 2]));
    assert!(forest.paths.contains(&vec![0, 3, 4, 5, 2]));
    assert_eq!((forest.min_len, forest.max_len), (3, 5));
    for path in &forest.paths {
        assert_eq!(grid.path_cost(path), forest.cost);
    }

    let (grid, start, target) = parse(
        "S,,G
         .ff.",
    );
    let mut search = Dijkstra::dijkstra(&grid);
    search.prepare(start, target).unwrap();
    assert!(search.find_shortest_path().unwrap());
    let forest = search.find_alternative_paths().unwrap();
    // Top: 2 + 2 + 1 = 5. Bottom: 1 + 3 + 3 + 1 + 1 = 9.
    assert_eq!(forest.cost, 5);
    assert_eq!(forest.count, 1);
    assert_eq!((forest.min_len, forest.max_len), (4, 4));
}

#[test]
fn test_unknown_target_is_not_found() {
    let (grid, start, target) = parse("S..G");
    let mut grid = grid;
    grid.set_known(target, false);

    let mut search = AStar::a_star(&grid);
    search.prepare(start, target).unwrap();
    assert!(!search.find_shortest_path().unwrap());
    assert_eq!(search.phase(), Phase::Exhausted);
    assert_eq!(search.cost(target), INFINITE);
    assert_eq!(search.fog(), vec![target]);

    // The full map still has a route.
    assert!(grid.optimal_cost(start, target, false).is_some());
}

#[test]
fn test_blocked_map_empties_frontier() {
    let (grid, start, target) = parse(
        "S.#.
         ..#G",
    );
    let mut search = AStar::a_star(&grid);
    search.prepare(start, target).unwrap();

    assert!(!search.find_shortest_path().unwrap());
    assert!(search.frontier().is_empty());
    assert_eq!(search.visited_count(), 4);
    assert!(matches!(
        search.find_alternative_paths(),
        Err(SearchError::InvalidPhase { .. })
    ));
}

#[test]
fn test_fog_nodes_never_get_a_cost() {
    let (grid, start, target) = parse(
        "S.?..
         .??..
         ....G",
    );
    let mut search = AStar::a_star(&grid);
    search.prepare(start, target).unwrap();
    assert!(search.find_shortest_path().unwrap());
    let forest = search.find_alternative_paths().unwrap();

    for node in grid.nodes().iter().filter(|n| !n.known) {
        assert_eq!(search.cost(node.id), INFINITE, "fog node {} got a cost", node.id);
        assert!(forest.paths.iter().all(|path| !path.contains(&node.id)));
    }
    assert_eq!(forest.cost, 6);
}

#[test]
fn test_reset_then_prepare_is_idempotent() {
    let (grid, start, target) = parse(
        "S,f..
         .h#,.
         ..,.G",
    );
    let mut search = SearchEngine::new(&grid, Strategy::AStar);

    search.prepare(start, target).unwrap();
    let prepared = search.state().clone();
    assert!(search.find_shortest_path().unwrap());
    let first_state = search.state().clone();
    let first_forest = search.find_alternative_paths().unwrap();

    search.reset();
    assert_eq!(search.phase(), Phase::Idle);
    search.prepare(start, target).unwrap();
    assert_eq!(search.state(), &prepared);
    assert!(search.find_shortest_path().unwrap());
    assert_eq!(search.state(), &first_state);
    assert_eq!(search.find_alternative_paths().unwrap(), first_forest);
}

#[test]
fn test_steps_describe_each_expansion() {
    let (grid, start, target) = parse(
        "S..
         ..G",
    );
    let mut search = AStar::a_star(&grid).with_step_detail(true);
    search.prepare(start, target).unwrap();
    search.find_shortest_path().unwrap();

    let passable = grid.nodes().iter().filter(|n| n.cost() != INFINITE).count();
    let steps = search.steps();
    assert_eq!(steps.len(), search.explored_count());
    assert_eq!(steps[0].expanded, start);
    assert_eq!(steps[0].best_path, vec![start]);
    assert!(steps.windows(2).all(|w| w[0].index < w[1].index));
    assert!(steps.iter().all(|s| s.passable == passable));
    assert!(steps.iter().all(|s| s.frontier.len() == s.frontier_len));
    assert!(steps.iter().all(|s| s.phase == StepPhase::Forward));
}

#[test]
fn test_alternative_expansions_are_recorded_as_steps() {
    // A B
    // C D
    let (grid, start, target) = parse(
        "S.
         .G",
    );
    let mut search = AStar::a_star(&grid).with_step_detail(true);
    search.prepare(start, target).unwrap();
    assert!(search.find_shortest_path().unwrap());
    let forward = search.steps().len();

    search.find_alternative_paths().unwrap();
    let steps = search.steps();
    assert_eq!(steps.len(), search.explored_count());
    assert!(steps.len() > forward);
    assert!(steps[..forward].iter().all(|s| s.phase == StepPhase::Forward));
    for step in &steps[forward..] {
        assert_eq!(step.phase, StepPhase::Alternatives);
        assert_eq!(step.best_path, vec![start, step.expanded]);
        assert_ne!(step.expanded, target);
    }
}

#[test]
fn test_stepped_and_one_shot_runs_agree() {
    let (grid, start, target) = parse(
        "S,f..
         .h#,.
         ..,.G",
    );
    let mut stepped = AStar::a_star(&grid);
    stepped.prepare(start, target).unwrap();
    while !stepped.step().unwrap().is_target_settled {}

    let mut one_shot = AStar::a_star(&grid);
    one_shot.prepare(start, target).unwrap();
    assert!(one_shot.find_shortest_path().unwrap());

    assert_eq!(stepped.find_shortest_path(), Ok(true));
    assert_eq!(stepped.state(), one_shot.state());
    assert_eq!(
        stepped.find_alternative_paths().unwrap(),
        one_shot.find_alternative_paths().unwrap()
    );
}
