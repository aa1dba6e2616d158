//! Structural properties that must hold for any tree reachable through the
//! public API.

use std::cell::RefCell;
use std::rc::Rc;

use boxlayout::{
    BoxLayout, ElementId, LayoutSnapshot, Position, Rectangle, TabPanel, shared,
};
use boxlayout_test_utils::{MockPanel, MockRenderFactory, PanelCall, mock_config, mock_layout};

const EPSILON: f32 = 1e-3;

/// Small deterministic generator so failures are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

fn attached(layout: &BoxLayout) -> Vec<ElementId> {
    let tree = layout.tree();
    match tree.root() {
        Some(root) => tree.subtree(root),
        None => Vec::new(),
    }
}

fn assert_tiles(layout: &BoxLayout) {
    let tree = layout.tree();
    for id in attached(layout) {
        let node = tree.get(id).unwrap();
        let Some(c) = node.container() else {
            continue;
        };
        let outer = node.bounds;
        let first = tree.get(c.first).unwrap().bounds;
        let second = tree.get(c.second).unwrap().bounds;

        if c.is_vertical {
            assert!((first.y - outer.y).abs() < EPSILON, "{id}: first starts at top");
            assert!((second.y - (first.bottom() + c.gap)).abs() < EPSILON, "{id}: gap band");
            assert!((second.bottom() - outer.bottom()).abs() < EPSILON, "{id}: fills height");
            for r in [first, second] {
                assert_eq!(r.x, outer.x);
                assert_eq!(r.width, outer.width);
            }
        } else {
            assert!((first.x - outer.x).abs() < EPSILON, "{id}: first starts at left");
            assert!((second.x - (first.right() + c.gap)).abs() < EPSILON, "{id}: gap band");
            assert!((second.right() - outer.right()).abs() < EPSILON, "{id}: fills width");
            for r in [first, second] {
                assert_eq!(r.y, outer.y);
                assert_eq!(r.height, outer.height);
            }
        }
    }
}

fn random_dock(layout: &mut BoxLayout, rng: &mut XorShift) -> ElementId {
    // tool groups dock outside the document area only
    let targets: Vec<ElementId> = attached(layout)
        .into_iter()
        .filter(|id| !layout.tree().in_document_area(*id))
        .collect();
    let target = targets[rng.below(targets.len())];
    let position = Position::ALL[rng.below(4)];
    let group = layout.create_tab_group().unwrap();
    assert!(layout.add_box_element(target, group, position).unwrap());
    group
}

#[test]
fn test_containers_tile_their_area() {
    for (seed, gap) in [(7_u64, 0.0), (42, 1.0), (1234, 2.5)] {
        let renders = Rc::new(MockRenderFactory::new());
        let mut layout = BoxLayout::new();
        layout
            .init(
                Rectangle::new(10.0, 20.0, 1600.0, 1200.0),
                mock_config(&renders).with_gap(gap),
            )
            .unwrap();
        let mut rng = XorShift(seed);

        for _ in 0..6 {
            random_dock(&mut layout, &mut rng);
            assert_tiles(&layout);
        }
        // growing never squeezes a stretch child below the gap
        for (width, height) in [(1700.0, 1300.0), (2400.0, 1500.0)] {
            layout
                .resize(Rectangle::new(0.0, 0.0, width, height))
                .unwrap();
            assert_tiles(&layout);
        }
        layout.tree().validate().unwrap();
    }
}

#[test]
fn test_add_then_remove_restores_topology() {
    let (mut layout, _renders) = mock_layout(1200.0, 800.0);
    let base_group = layout.create_tab_group().unwrap();
    layout
        .add_box_element_to_root(base_group, Position::Left)
        .unwrap();
    let base = layout.get_layout_config().unwrap();

    for seed in [3_u64, 99, 2024] {
        let mut rng = XorShift(seed);
        let mut added: Vec<ElementId> = (0..8).map(|_| random_dock(&mut layout, &mut rng)).collect();

        while !added.is_empty() {
            let element = added.swap_remove(rng.below(added.len()));
            assert!(layout.remove_box_element(element).unwrap());
            layout.tree().validate().unwrap();
            for id in attached(&layout) {
                if let Some(c) = layout.tree().get(id).unwrap().container() {
                    assert_ne!(c.first, c.second);
                }
            }
        }
        assert_eq!(layout.get_layout_config().unwrap(), base);
    }
}

#[test]
fn test_document_is_never_removed() {
    let (mut layout, _renders) = mock_layout(800.0, 600.0);
    let document = layout.document_element().unwrap();
    let group = layout.create_tab_group().unwrap();
    layout.add_box_element_to_root(group, Position::Top).unwrap();
    let root = layout.root_element().unwrap();

    assert!(!layout.remove_box_element(document).unwrap());
    assert!(!layout.remove_box_element(root).unwrap());
    let inner = layout.document_group().unwrap();
    assert!(!layout.remove_box_element(inner).unwrap());
    assert!(layout.tree().contains(document));
    assert_eq!(layout.tree().get(document).unwrap().document_area().unwrap().root, inner);
}

fn populated_layout() -> (BoxLayout, Vec<boxlayout_test_utils::PanelProbe>) {
    let (mut layout, _renders) = mock_layout(1280.0, 720.0);
    let mut probes = Vec::new();
    for id in ["outline", "layers", "console", "scene", "assets"] {
        let panel = MockPanel::new(id).with_min_size(80.0, 60.0);
        probes.push(panel.probe());
        layout.regist_panel(panel.into_shared());
    }

    let document = layout.document_element().unwrap();
    layout.open_document_by_id("scene").unwrap();

    let left = layout.create_tab_group().unwrap();
    layout.add_box_element_to_root(left, Position::Left).unwrap();
    layout.add_panel_to_group(left, "outline").unwrap();
    layout.add_panel_to_group(left, "layers").unwrap();
    layout.select_tab(left, 0).unwrap();

    let bottom = layout.create_tab_group().unwrap();
    layout.add_box_element(document, bottom, Position::Bottom).unwrap();
    layout.add_panel_to_group(bottom, "console").unwrap();
    layout.add_panel_to_group(bottom, "assets").unwrap();
    layout
        .set_explicit_size(bottom, None, Some(180.0))
        .unwrap();

    (layout, probes)
}

#[test]
fn test_snapshot_round_trip() {
    let (mut layout, probes) = populated_layout();
    let snapshot = layout.get_layout_config().unwrap();
    let left = layout.get_element_by_panel_id("outline").unwrap();
    assert_eq!(layout.group(left).unwrap().selected_index(), Some(0));

    layout.apply_layout_config(&snapshot).unwrap();
    assert_eq!(layout.get_layout_config().unwrap(), snapshot);

    let left = layout.get_element_by_panel_id("outline").unwrap();
    assert_eq!(layout.get_element_by_panel_id("layers"), Some(left));
    assert_eq!(layout.group(left).unwrap().selected_index(), Some(0));
    assert!(layout
        .tree()
        .get(layout.get_element_by_panel_id("scene").unwrap())
        .unwrap()
        .is_document());

    // open panels survive the rebuild without being remounted
    for probe in &probes {
        assert_eq!(probe.count(&PanelCall::Mount), 1);
        assert_eq!(probe.count(&PanelCall::Unmount), 0);
    }
}

#[test]
fn test_json_round_trip_into_fresh_layout() {
    let (layout, _probes) = populated_layout();
    let json = layout.get_layout_config_json().unwrap();

    let (mut restored, _renders) = mock_layout(1280.0, 720.0);
    for id in ["outline", "layers", "console", "scene", "assets"] {
        restored.regist_panel(MockPanel::new(id).with_min_size(80.0, 60.0).into_shared());
    }
    restored.apply_layout_config_json(&json).unwrap();

    assert_eq!(
        restored.get_layout_config().unwrap(),
        LayoutSnapshot::from_json(&json).unwrap()
    );
    assert_eq!(restored.get_all_open_panels().len(), 5);
}

#[test]
fn test_round_trip_keeps_empty_docked_group() {
    let (mut layout, _renders) = mock_layout(800.0, 600.0);
    let document = layout.document_element().unwrap();
    let group = layout.create_tab_group().unwrap();
    layout.set_explicit_size(group, Some(200.0), None).unwrap();
    layout.add_box_element(document, group, Position::Left).unwrap();
    let snapshot = layout.get_layout_config().unwrap();

    layout.apply_layout_config(&snapshot).unwrap();
    assert_eq!(layout.get_layout_config().unwrap(), snapshot);

    let root = layout.root_element().unwrap();
    let container = layout.tree().get(root).unwrap().container().unwrap();
    let restored = container.first;
    assert!(layout.group(restored).unwrap().is_empty());
    assert_eq!(layout.tree().get(restored).unwrap().bounds.width, 200.0);
    assert!(layout.tree().get(container.second).unwrap().is_document_area());
}

#[test]
fn test_round_trip_keeps_split_document_area() {
    let (mut layout, _renders) = mock_layout(1000.0, 700.0);
    for id in ["left.rs", "right.rs", "notes.md", "console"] {
        layout.regist_panel(MockPanel::new(id).into_shared());
    }
    layout.open_document_by_id("left.rs").unwrap();
    layout.open_document_by_id("right.rs").unwrap();
    layout.open_panel_by_id("console", false).unwrap();
    let left = layout.document_group().unwrap();
    assert!(layout.add_panel_to(left, "right.rs", Some(Position::Right)).unwrap());
    let right = layout.get_element_by_panel_id("right.rs").unwrap();
    assert!(layout.add_panel_to(right, "notes.md", Some(Position::Bottom)).unwrap());
    assert_eq!(layout.tree().document_groups().len(), 3);

    let snapshot = layout.get_layout_config().unwrap();
    let json = layout.get_layout_config_json().unwrap();
    layout.apply_layout_config(&snapshot).unwrap();
    assert_eq!(layout.get_layout_config().unwrap(), snapshot);

    let tree = layout.tree();
    assert_eq!(tree.document_groups().len(), 3);
    for id in ["left.rs", "right.rs", "notes.md"] {
        let group = layout.get_element_by_panel_id(id).unwrap();
        assert!(tree.get(group).unwrap().is_document());
        assert!(tree.in_document_area(group));
    }
    let console = layout.get_element_by_panel_id("console").unwrap();
    assert!(!tree.in_document_area(console));
    tree.validate().unwrap();

    // the same nesting comes back in a fresh layout
    let (mut restored, _renders) = mock_layout(1000.0, 700.0);
    for id in ["left.rs", "right.rs", "notes.md", "console"] {
        restored.regist_panel(MockPanel::new(id).into_shared());
    }
    restored.apply_layout_config_json(&json).unwrap();
    assert_eq!(restored.tree().document_groups().len(), 3);
    assert_eq!(
        restored.get_layout_config().unwrap(),
        LayoutSnapshot::from_json(&json).unwrap()
    );
}

/// Panel writing focus callbacks into a log shared by every panel.
struct FocusLogged {
    id: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl TabPanel for FocusLogged {
    fn id(&self) -> &str {
        self.id
    }

    fn title(&self) -> &str {
        self.id
    }

    fn focus_in(&mut self) {
        self.log.borrow_mut().push(format!("in:{}", self.id));
    }

    fn focus_out(&mut self) {
        self.log.borrow_mut().push(format!("out:{}", self.id));
    }
}

#[test]
fn test_focus_is_exclusive_and_ordered() {
    let (mut layout, _renders) = mock_layout(1000.0, 800.0);
    let log = Rc::new(RefCell::new(Vec::new()));
    for id in ["a", "b", "c"] {
        layout.regist_panel(shared(FocusLogged {
            id,
            log: log.clone(),
        }));
    }
    layout.open_panel_by_id("a", false).unwrap();
    layout.open_document_by_id("b").unwrap();
    let group = layout.create_tab_group().unwrap();
    layout.add_box_element_to_root(group, Position::Bottom).unwrap();
    layout.add_panel_to_group(group, "c").unwrap();

    layout.focus_panel("a").unwrap();
    layout.focus_panel("a").unwrap();
    layout.focus_panel("b").unwrap();
    layout.clear_focus().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "in:a", "out:a", "in:b", "out:b", "in:c", "out:c", "in:a", "out:a", "in:b", "out:b",
        ]
    );
    assert_eq!(layout.focused_panel_id(), None);

    // replaying the log never shows two panels holding focus
    let mut holders = 0_i32;
    for entry in log.borrow().iter() {
        holders += if entry.starts_with("in:") { 1 } else { -1 };
        assert!((0..=1).contains(&holders));
    }
}

#[test]
fn test_active_groups_are_tracked_per_kind() {
    let (mut layout, _renders) = mock_layout(1000.0, 800.0);
    for id in ["tool", "doc"] {
        layout.regist_panel(MockPanel::new(id).into_shared());
    }
    layout.open_panel_by_id("tool", false).unwrap();
    layout.open_document_by_id("doc").unwrap();

    let tool_group = layout.get_element_by_panel_id("tool").unwrap();
    assert_eq!(layout.get_active_tab_group(), layout.document_group());
    assert_eq!(
        layout.get_active_tab_group_of(boxlayout::GroupKind::Tool),
        Some(tool_group)
    );
    assert_eq!(
        layout
            .get_active_panel()
            .map(|p| p.borrow().id().to_owned()),
        Some("doc".to_owned())
    );
}
