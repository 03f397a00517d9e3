// Integration tests for entity resolution and strict DE validation

use caddy_iges::entities::parameter_partition;
use caddy_iges::model::SubordinateSwitch;
use caddy_iges::{
    read_iges, read_iges_intermediate, write_iges, EntityData, IgesError,
};

fn line(data: &str, section: char, seq: u32) -> String {
    format!("{:<72}{}{:>7}", data, section, seq)
}

fn global_lines(file_name: &str) -> Vec<String> {
    vec![
        format!(
            ",,8HTestCase,{}H{},6Hnative,4H1.00,32,38,6,308,15,,1.,1,4HINCH,",
            file_name.len(),
            file_name
        ),
        "1,1.,15H20240101.120000,1.E-6,0.;".to_string(),
    ]
}

fn de_lines(entity_type: i32, pd_pointer: u32, line_count: u32, status: &str) -> [String; 2] {
    [
        format!(
            "{:>8}{:>8}       0       0       0       0       0       0{}",
            entity_type, pd_pointer, status
        ),
        format!(
            "{:>8}       0       0{:>8}       0                               0",
            entity_type, line_count
        ),
    ]
}

fn temp_path(name: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("caddy-iges-test-{}-{}", std::process::id(), name));
    path
}

/// Three circular arcs at DE 1, 3, 5 and a composite curve at DE 7
/// referencing them
fn composite_file() -> Vec<u8> {
    let mut text = String::new();
    text.push_str(&line("composite curve over three arcs", 'S', 1));
    text.push('\n');
    for (i, data) in global_lines("comp.igs").iter().enumerate() {
        text.push_str(&line(data, 'G', i as u32 + 1));
        text.push('\n');
    }

    let mut de_seq = 1u32;
    for (entity_type, pd_pointer, status) in [
        (100, 1, "00010000"),
        (100, 2, "00010000"),
        (100, 3, "00010000"),
        (102, 4, "00000000"),
    ] {
        for de_line in de_lines(entity_type, pd_pointer, 1, status) {
            text.push_str(&line(&de_line, 'D', de_seq));
            text.push('\n');
            de_seq += 1;
        }
    }

    for (i, (data, de_pointer)) in [
        ("100,0.,0.,0.,2.,0.,-2.,0.;", 1),
        ("100,0.,1.,1.,2.,1.,0.,1.;", 3),
        ("100,0.,2.,2.,3.,2.,1.,2.;", 5),
        ("102,3,1,3,5;", 7),
    ]
    .iter()
    .enumerate()
    {
        text.push_str(&line(
            &format!("{:<64}{:>8}", data, de_pointer),
            'P',
            i as u32 + 1,
        ));
        text.push('\n');
    }
    text.push_str(&line("S      1G      2D      8P      4", 'T', 1));
    text.push('\n');
    text.into_bytes()
}

#[test]
fn test_composite_curve_references_resolve() {
    let path = temp_path("composite.igs");
    std::fs::write(&path, composite_file()).unwrap();

    let model = read_iges(&path, false).unwrap();
    assert_eq!(model.len(), 4);
    assert!(model.unresolved_references().is_empty());

    let composite = model.iter().find(|e| e.entity_type() == 102).unwrap();
    let arc_ids: Vec<_> = model
        .iter()
        .filter(|e| e.entity_type() == 100)
        .map(|e| e.id())
        .collect();
    assert_eq!(composite.referenced_ids(), arc_ids);
    match composite.data() {
        EntityData::CompositeCurve(curve) => assert_eq!(curve.curves, arc_ids),
        other => panic!("expected a composite curve, got {:?}", other),
    }

    // the arcs are physically dependent children of the composite
    let children = model.children_of(composite.id(), SubordinateSwitch::PhysicallyDependent);
    assert_eq!(children, arc_ids);

    // ids are unique and stable
    let composite_id = composite.id();
    assert_eq!(model.get(composite_id).unwrap().id(), composite_id);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_resolved_round_trip_preserves_graph() {
    let input = temp_path("composite-rt-in.igs");
    let output = temp_path("composite-rt-out.igs");
    std::fs::write(&input, composite_file()).unwrap();

    let model = read_iges(&input, false).unwrap();
    write_iges(&model, &output, false).unwrap();

    let reread = read_iges(&output, false).unwrap();
    assert_eq!(reread.len(), 4);
    assert!(reread.unresolved_references().is_empty());
    let composite = reread.iter().find(|e| e.entity_type() == 102).unwrap();
    assert_eq!(composite.referenced_ids().len(), 3);

    for path in [&input, &output] {
        std::fs::remove_file(path).ok();
    }
}

#[test]
fn test_nurbs_partition_and_formats() {
    let mut text = String::new();
    text.push_str(&line("nurbs curve", 'S', 1));
    text.push('\n');
    for (i, data) in global_lines("nurbs.igs").iter().enumerate() {
        text.push_str(&line(data, 'G', i as u32 + 1));
        text.push('\n');
    }
    for (i, de_line) in de_lines(126, 1, 3, "00000000").iter().enumerate() {
        text.push_str(&line(de_line, 'D', i as u32 + 1));
        text.push('\n');
    }
    for (i, data) in [
        "126,3,3,0,0,0,0,0,0,0,0,1,1,1,1,1,1,1,1,",
        "-4,-4,0,-1.5,7,3.5,4,-3,1,4,4,0,",
        "0,1,0,0,1;",
    ]
    .iter()
    .enumerate()
    {
        text.push_str(&line(&format!("{:<64}{:>8}", data, 1), 'P', i as u32 + 1));
        text.push('\n');
    }
    text.push_str(&line("S      1G      2D      2P      3", 'T', 1));
    text.push('\n');

    let path = temp_path("nurbs.igs");
    std::fs::write(&path, text).unwrap();

    let intermediate = read_iges_intermediate(&path, false).unwrap();
    let params = &intermediate.parameters[0].params;
    assert_eq!(params.len(), 35);

    // the partition covers every token as entity-specific data
    let partition = parameter_partition(126, 0, params).unwrap();
    assert_eq!(partition.n_entity, 35);
    assert_eq!(partition.n_assoc, 0);
    assert_eq!(partition.n_props, 0);
    assert_eq!(partition.total(), params.len());

    // formats survive: "-1.5" has integer and fraction parts, "7" is an
    // integer token reinterpreted later
    let format = params.format(21).unwrap();
    assert_eq!(format.parameter_type, caddy_iges::ParameterType::Real);
    assert!(format.has_integer && format.has_fraction);

    let model = read_iges(&path, false).unwrap();
    let entity = model.iter().next().unwrap();
    match entity.data() {
        EntityData::RationalBSplineCurve(curve) => {
            assert_eq!(curve.degree, 3);
            assert_eq!(curve.control_points.len(), 4);
            assert_eq!(curve.knots, vec![0., 0., 0., 0., 1., 1., 1., 1.]);
        }
        other => panic!("expected a B-spline curve, got {:?}", other),
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_strict_mode_rejects_bad_use_flag() {
    // a curve-on-parametric-surface whose status claims use flag 05;
    // the specification allows only 00 for type 142
    let mut text = String::new();
    text.push_str(&line("strict rejection", 'S', 1));
    text.push('\n');
    for (i, data) in global_lines("strict.igs").iter().enumerate() {
        text.push_str(&line(data, 'G', i as u32 + 1));
        text.push('\n');
    }
    for (i, de_line) in de_lines(142, 1, 1, "00000500").iter().enumerate() {
        text.push_str(&line(de_line, 'D', i as u32 + 1));
        text.push('\n');
    }
    text.push_str(&line(
        &format!("{:<64}{:>8}", "142,1,3,0,0,1;", 1),
        'P',
        1,
    ));
    text.push('\n');
    text.push_str(&line("S      1G      2D      2P      1", 'T', 1));
    text.push('\n');

    let path = temp_path("strict.igs");
    std::fs::write(&path, &text).unwrap();

    let err = read_iges_intermediate(&path, true);
    assert!(matches!(err, Err(IgesError::DataFormat(_))));

    // tolerant mode accepts the record and echoes the status on write
    let model = read_iges_intermediate(&path, false).unwrap();
    let output = temp_path("strict-out.igs");
    caddy_iges::write_iges_intermediate(&model, &output).unwrap();
    let written = String::from_utf8(std::fs::read(&output).unwrap()).unwrap();
    let de_line = written.lines().find(|l| l.as_bytes()[72] == b'D').unwrap();
    assert_eq!(&de_line[64..72], "00000500");

    for path in [&path, &output] {
        std::fs::remove_file(path).ok();
    }
}

#[test]
fn test_blank_required_de_fields_fail() {
    // a blank parameter-data pointer is not defaultable
    let mut text = String::new();
    text.push_str(&line("blank pointer", 'S', 1));
    text.push('\n');
    for (i, data) in global_lines("blank.igs").iter().enumerate() {
        text.push_str(&line(data, 'G', i as u32 + 1));
        text.push('\n');
    }
    let bad_first =
        "     100               0       0       0       0       0       000000000";
    let second =
        "     100       0       0       1       0                               0";
    text.push_str(&line(bad_first, 'D', 1));
    text.push('\n');
    text.push_str(&line(second, 'D', 2));
    text.push('\n');
    text.push_str(&line(
        &format!("{:<64}{:>8}", "100,0.,0.,0.,2.,0.,-2.,0.;", 1),
        'P',
        1,
    ));
    text.push('\n');
    text.push_str(&line("S      1G      2D      2P      1", 'T', 1));
    text.push('\n');

    let path = temp_path("blank-de.igs");
    std::fs::write(&path, text).unwrap();
    let err = read_iges_intermediate(&path, false);
    assert!(matches!(err, Err(IgesError::TypeConversion(_))));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_dangling_pd_pointer_fails_resolution() {
    let mut text = String::new();
    text.push_str(&line("dangling pointer", 'S', 1));
    text.push('\n');
    for (i, data) in global_lines("dangl.igs").iter().enumerate() {
        text.push_str(&line(data, 'G', i as u32 + 1));
        text.push('\n');
    }
    for (i, de_line) in de_lines(102, 1, 1, "00000000").iter().enumerate() {
        text.push_str(&line(de_line, 'D', i as u32 + 1));
        text.push('\n');
    }
    // the composite names DE 9, which does not exist
    text.push_str(&line(
        &format!("{:<64}{:>8}", "102,1,9;", 1),
        'P',
        1,
    ));
    text.push('\n');
    text.push_str(&line("S      1G      2D      2P      1", 'T', 1));
    text.push('\n');

    let path = temp_path("dangling.igs");
    std::fs::write(&path, text).unwrap();
    assert!(read_iges_intermediate(&path, false).is_ok());
    let err = read_iges(&path, false);
    assert!(matches!(err, Err(IgesError::DataFormat(_))));
    std::fs::remove_file(&path).ok();
}
