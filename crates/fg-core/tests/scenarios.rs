use std::collections::HashSet;

use fg_core::config::StepConfig;
use fg_core::connect::place_special_room;
use fg_core::{
    Dir4, FloorPlan, GridPlan, HallGen, Loc, NodeRef, NodeTags, RandRange, Rect, RoomGen, Tile,
    TileGrid,
};
use fg_rng::{GameRng, TracingRng};

fn square_at(x: i32, y: i32, w: i32, h: i32) -> RoomGen {
    RoomGen::placed_square(Rect::new(x, y, w, h))
}

#[test]
fn test_special_room_replaces_anchor() {
    let mut plan = FloorPlan::new(Loc::new(12, 12));
    let t = NodeTags::empty();
    let big = plan.add_room(&square_at(3, 3, 6, 6), t, &[]).unwrap();
    let small = plan.add_room(&square_at(5, 1, 2, 2), t, &[big]).unwrap();
    let small_id = plan.node(small).unwrap().id();

    let special = RoomGen::square(RandRange::fixed(2), RandRange::fixed(2));
    let mut rng = GameRng::new(77);
    let placed = place_special_room(&mut plan, &mut rng, big.index, &special, NodeTags::empty()).unwrap();

    assert_eq!(plan.room_count(), 2);
    assert_eq!(plan.rect(placed), Some(Rect::new(5, 3, 2, 2)));
    let small = plan.resolve(small_id).unwrap();
    assert_eq!(plan.rect(small), Some(Rect::new(5, 1, 2, 2)));
    assert_eq!(plan.adjacents(small), vec![placed]);
    assert_eq!(plan.adjacents(placed), vec![small]);
    assert!(plan.rooms().iter().all(|n| n.shape.draw_rect() != Rect::new(3, 3, 6, 6)));
}

#[test]
fn test_shortcut_closes_a_chain() {
    let mut plan = FloorPlan::new(Loc::new(9, 6));
    let t = NodeTags::empty();
    let a = plan.add_room(&square_at(0, 0, 3, 3), t, &[]).unwrap();
    let b = plan.add_room(&square_at(0, 3, 3, 3), t, &[a]).unwrap();
    let h = plan
        .add_hall(&RoomGen::placed_hall(Rect::new(3, 4, 3, 1)), t, &[b])
        .unwrap();
    let c = plan.add_room(&square_at(6, 3, 3, 3), t, &[h]).unwrap();
    let d = plan.add_room(&square_at(6, 0, 3, 3), t, &[c]).unwrap();

    let step = StepConfig::from_json(r#"{ "step": "connect_branch", "connect_percent": 100 }"#)
        .unwrap()
        .into_floor_step()
        .unwrap();
    let mut rng = GameRng::new(12);
    step.apply(&mut plan, &mut rng).unwrap();

    assert_eq!(plan.hall_count(), 2);
    let shortcut = NodeRef::hall(1);
    assert_eq!(plan.rect(shortcut), Some(Rect::new(3, 0, 3, 3)));
    let ends: HashSet<_> = plan.adjacents(shortcut).into_iter().collect();
    assert_eq!(ends, HashSet::from([a, d]));
    assert!(plan.node_refs().all(|r| plan.degree(r) == 2));

    let mut map = TileGrid::new(9, 6);
    plan.draw_on_map(&mut map).unwrap();
    let walkable = map.count(Tile::Room) + map.count(Tile::Hall);
    assert_eq!(map.flood_count(Loc::new(0, 0)), walkable);
}

#[test]
fn test_grid_ring_becomes_a_cycle() {
    let mut grid = GridPlan::new(2, 2, Loc::new(5, 5), 2);
    let cells = [Loc::new(0, 0), Loc::new(1, 0), Loc::new(1, 1), Loc::new(0, 1)];
    for cell in cells {
        let shape = RoomGen::square(RandRange::new(2, 5), RandRange::new(2, 5));
        grid.add_room(Rect::from_loc_size(cell, Loc::splat(1)), shape, NodeTags::empty(), false)
            .unwrap();
    }
    let hall = HallGen::angled(RandRange::fixed(1), RandRange::fixed(1));
    for i in 0..4 {
        grid.set_connecting_hall(cells[i], cells[(i + 1) % 4], Some(hall.clone()))
            .unwrap();
    }
    assert!(grid.has_hall(Loc::new(0, 0), Dir4::Right));
    assert!(grid.has_hall(Loc::new(0, 0), Dir4::Down));

    let mut rng = GameRng::new(31);
    let plan = grid.place_rooms_on_floor(&mut rng).unwrap();
    assert_eq!(plan.room_count(), 4);
    assert_eq!(plan.hall_count(), 4);

    // grid room i became floor room i
    let mut pairs = HashSet::new();
    for (i, _) in plan.halls().iter().enumerate() {
        let mut ends: Vec<usize> = plan
            .adjacents(NodeRef::hall(i))
            .into_iter()
            .map(|r| {
                assert!(!r.is_hall());
                r.index
            })
            .collect();
        ends.sort();
        assert_eq!(ends.len(), 2);
        pairs.insert((ends[0], ends[1]));
    }
    assert_eq!(pairs, HashSet::from([(0, 1), (1, 2), (2, 3), (0, 3)]));
    for i in 0..4 {
        let room = NodeRef::room(i);
        assert_eq!(plan.degree(room), 2);
        assert!(!plan.is_choke_point(room));
    }
    assert_eq!(plan.distance(NodeRef::room(0), NodeRef::room(2)), Some(4));
}

#[test]
fn test_full_pipeline_stays_connected() {
    let steps = r#"[
        {
            "step": "floor_path_branch",
            "fill_percent": { "min": 30, "max": 50 },
            "branch_ratio": { "min": 20, "max": 60 },
            "hall_percent": 50,
            "rooms": [[{ "shape": "square", "width": { "min": 3, "max": 7 }, "height": { "min": 3, "max": 7 } }, 1]],
            "halls": [[{ "shape": "angled_hall", "width": { "min": 1, "max": 5 }, "height": { "min": 1, "max": 5 } }, 1]]
        },
        { "step": "connect_branch", "connect_percent": 60 },
        {
            "step": "special_room",
            "rooms": [[{ "shape": "square", "width": { "min": 2, "max": 4 }, "height": { "min": 2, "max": 4 } }, 1]]
        }
    ]"#;
    let configs = StepConfig::list_from_json(steps).unwrap();

    for seed in 0..12 {
        let mut plan = FloorPlan::new(Loc::new(60, 40));
        let mut rng = TracingRng::new(GameRng::new(seed));
        for config in configs.clone() {
            let step = config.into_floor_step().unwrap();
            step.apply(&mut plan, &mut rng).unwrap();
        }
        assert!(plan.is_connected(), "seed {seed}");
        assert!(rng.call_count() > 0);
        let specials = plan
            .rooms()
            .iter()
            .filter(|n| n.tags.contains(NodeTags::SPECIAL))
            .count();
        assert_eq!(specials, 1, "seed {seed}");

        let mut map = TileGrid::new(60, 40);
        plan.draw_on_map(&mut map).unwrap();
        let start = plan.rooms()[0].shape.draw_rect().start();
        let walkable = map.count(Tile::Room) + map.count(Tile::Hall);
        assert_eq!(map.flood_count(start), walkable, "seed {seed}");
    }
}

#[test]
fn test_same_seed_same_plan() {
    let config = StepConfig::from_json(
        r#"{
            "step": "floor_path_branch",
            "branch_ratio": { "min": 50, "max": 51 },
            "rooms": [[{ "shape": "round", "width": { "min": 4, "max": 8 }, "height": { "min": 4, "max": 8 } }, 1]],
            "halls": [[{ "shape": "single" }, 1]]
        }"#,
    )
    .unwrap();
    let run = |seed| {
        let mut plan = FloorPlan::new(Loc::new(50, 30));
        let mut rng = GameRng::new(seed);
        config.clone().into_floor_step().unwrap().apply(&mut plan, &mut rng).unwrap();
        plan.node_refs().map(|r| plan.rect(r)).collect::<Vec<_>>()
    };
    assert_eq!(run(5), run(5));
}
