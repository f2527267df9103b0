use canopy::{
    LeafHabit, PlantSymbolData, PresetLookup, PresetOverride, PresetRepository, RenderOptions,
    RenderingPreset, Scale, Season, SymbolRenderer, SymbolStyle, WinterInterest,
};
use quick_xml::Reader;
use quick_xml::events::Event;

const CORNUS: &str = r#"{
    "botanical_name": "Cornus sanguinea 'Midwinter Fire'",
    "common_name": "Dogwood",
    "botanical_params": {
        "spread_cm": 1000,
        "height_cm": 250,
        "scale_box_cm": 1000,
        "center_cm": {"x": 500, "y": 500},
        "leaf_habit": "deciduous",
        "crown_texture": "medium",
        "crown_density_value": 0.6,
        "winter_interest": "red_stems"
    },
    "outline_cm": []
}"#;

const SURVEYED: &str = r#"{
    "botanical_name": "Fagus sylvatica",
    "botanical_params": {"spread_cm": 700, "height_cm": 900},
    "outline_cm": [[200, 300], [1200, 250], [1350, 900], [700, 1300], [250, 1000]]
}"#;

fn assert_well_formed(svg: &str) {
    let mut reader = Reader::from_str(svg);
    let mut depth = 0i32;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed SVG at {}: {}", reader.buffer_position(), e),
        }
    }
    assert_eq!(depth, 0, "unbalanced elements");
}

fn renderer() -> SymbolRenderer<PresetRepository> {
    SymbolRenderer::with_builtin_presets()
}

#[test]
fn independent_renders_are_byte_identical() {
    let plant = PlantSymbolData::from_json(CORNUS).expect("valid plant");
    let options = RenderOptions {
        style: SymbolStyle::Watercolor,
        season: Season::Autumn,
        scale: Scale::default(),
        seed: 2024,
        show_outline: true,
    };
    let a = renderer().render(&plant, &options).expect("renders");
    let b = renderer().render(&plant, &options).expect("renders");
    assert_eq!(a, b);

    let other_seed = RenderOptions { seed: 2025, ..options };
    assert_ne!(a, renderer().render(&plant, &other_seed).expect("renders"));
}

#[test]
fn ten_metre_spread_is_two_hundred_mm_at_one_to_fifty() {
    let plant = PlantSymbolData::from_json(CORNUS).expect("valid plant");
    let options = RenderOptions {
        scale: "1:50".parse().expect("scale"),
        ..RenderOptions::default()
    };
    let svg = renderer().render(&plant, &options).expect("renders");
    assert!(svg.contains(r#"width="200mm" height="200mm""#));
}

#[test]
fn full_pack_is_well_formed_xml() {
    let plant = PlantSymbolData::from_json(CORNUS).expect("valid plant");
    let pack = renderer().generate_pack(&plant, Scale::default(), 7);
    assert_eq!(pack.len(), 16);
    for (name, svg) in pack.files() {
        assert!(name.starts_with("Cornus_sanguinea_Midwinter_Fire__"), "{name}");
        assert_well_formed(svg);
    }
    let winter = pack
        .get(SymbolStyle::Scientific, Season::Winter)
        .expect("winter symbol");
    assert!(winter.contains(r#"data-feature="red_stems""#));
}

#[test]
fn surveyed_outline_is_used_as_given() {
    let plant = PlantSymbolData::from_json(SURVEYED).expect("valid plant");
    let svg = renderer()
        .render(&plant, &RenderOptions::default())
        .expect("renders");
    assert_well_formed(&svg);
    // 2500 cm frame for a 9 m tree: (200, 300) cm lands on (80, 120).
    assert!(svg.contains("M80 120 L480 100 L540 360"));
}

#[test]
fn unknown_species_renders_with_default_preset() {
    let mut plant = PlantSymbolData::from_json(CORNUS).expect("valid plant");
    plant.botanical_name = "Plantae incognita".to_string();
    plant.botanical_params.leaf_habit = None;
    plant.botanical_params.crown_texture = None;
    plant.botanical_params.crown_density_value = None;
    plant.botanical_params.winter_interest = None;

    let r = renderer();
    assert_eq!(r.presets().get(&plant.botanical_name), RenderingPreset::DEFAULT);
    let svg = r
        .render(&plant, &RenderOptions {
            season: Season::Winter,
            ..RenderOptions::default()
        })
        .expect("unknown species still renders");
    assert!(svg.contains(r#"data-leaf-habit="deciduous""#));
    assert!(!svg.contains("winter-interest"));
}

#[test]
fn tiny_canopy_renders_without_clusters() {
    let plant = PlantSymbolData::from_json(
        r#"{"botanical_name": "Buxus sempervirens", "botanical_params": {"spread_cm": 12, "height_cm": 20, "crown_texture": "coarse"}}"#,
    )
    .expect("valid plant");
    for style in SymbolStyle::ALL {
        let svg = renderer()
            .render(&plant, &RenderOptions {
                style: *style,
                ..RenderOptions::default()
            })
            .expect("renders");
        assert_well_formed(&svg);
        assert!(svg.contains(r#"data-cluster-count="0""#));
    }
}

#[test]
fn reviewed_updates_change_later_renders_only() {
    let plant = PlantSymbolData::from_json(
        r#"{"botanical_name": "Sorbus aucuparia", "botanical_params": {"spread_cm": 500, "height_cm": 900}}"#,
    )
    .expect("valid plant");
    let r = renderer();
    let options = RenderOptions {
        season: Season::Winter,
        ..RenderOptions::default()
    };
    let before = r.render(&plant, &options).expect("renders");
    assert!(before.contains(r#"data-feature="berries""#));

    r.presets()
        .update(
            "Sorbus aucuparia",
            &PresetOverride {
                winter_interest: Some(Some(WinterInterest::Flowers)),
                ..Default::default()
            },
        )
        .expect("valid update");
    let after = r.render(&plant, &options).expect("renders");
    assert!(after.contains(r#"data-feature="flowers""#));
}

#[test]
fn per_request_preset_overrides_the_store() {
    let plant = PlantSymbolData::from_json(
        r#"{"botanical_name": "Sorbus aucuparia", "botanical_params": {"spread_cm": 500, "height_cm": 900}}"#,
    )
    .expect("valid plant");
    let preset = RenderingPreset {
        leaf_habit: LeafHabit::Evergreen,
        ..RenderingPreset::DEFAULT
    };
    let svg = renderer()
        .render_with_preset(&plant, &RenderOptions::default(), &preset)
        .expect("renders");
    assert!(svg.contains(r#"data-leaf-habit="evergreen""#));
}
