//! Property tests for the overwrite-if-present merge

use proptest::prelude::*;
use tinyg_control_core::{AxisTable, MachineState, Merge, StatusReport};

fn axis() -> impl Strategy<Value = Option<f64>> {
    proptest::option::of(-1000.0f64..1000.0)
}

fn axis_table() -> impl Strategy<Value = Option<AxisTable>> {
    proptest::option::of((axis(), axis(), axis()).prop_map(|(x, y, z)| AxisTable {
        x,
        y,
        z,
        ..Default::default()
    }))
}

fn status_report() -> impl Strategy<Value = Option<StatusReport>> {
    proptest::option::of(
        (
            proptest::option::of(0u32..100_000),
            proptest::option::of(0.0f64..5000.0),
            proptest::option::of(0i64..14),
            proptest::option::of(0i64..7),
        )
            .prop_map(|(line, vel, stat, coor)| StatusReport {
                line_number: line,
                velocity: vel,
                machine_status: stat.map(Into::into),
                coordinate_system: coor.map(Into::into),
                ..Default::default()
            }),
    )
}

prop_compose! {
    fn machine_state()(
        fv in proptest::option::of(0.0f64..2.0),
        qr in proptest::option::of(0i64..32),
        sr in status_report(),
        mpo in axis_table(),
        pos in axis_table(),
        g54 in axis_table(),
        g92 in axis_table(),
    ) -> MachineState {
        MachineState {
            firmware_version: fv,
            queue_report: qr,
            status_report: sr,
            machine_position: mpo,
            working_position: pos,
            offset_g54: g54,
            offset_g92: g92,
            ..Default::default()
        }
    }
}

fn expected_axis(base: Option<f64>, a: Option<f64>, b: Option<f64>) -> Option<f64> {
    b.or(a).or(base)
}

fn expected_table(
    base: &Option<AxisTable>,
    a: &Option<AxisTable>,
    b: &Option<AxisTable>,
) -> Option<AxisTable> {
    if base.is_none() && a.is_none() && b.is_none() {
        return None;
    }
    let pick = |f: fn(&AxisTable) -> Option<f64>| {
        expected_axis(
            base.as_ref().and_then(f),
            a.as_ref().and_then(f),
            b.as_ref().and_then(f),
        )
    };
    Some(AxisTable {
        x: pick(|t| t.x),
        y: pick(|t| t.y),
        z: pick(|t| t.z),
        ..Default::default()
    })
}

proptest! {
    #[test]
    fn merging_twice_equals_merging_once(base in machine_state(), update in machine_state()) {
        let mut once = base.clone();
        once.merge_from(&update);
        let mut twice = once.clone();
        twice.merge_from(&update);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn last_writer_wins_per_field(base in machine_state(), a in machine_state(), b in machine_state()) {
        let mut state = base.clone();
        state.merge_from(&a);
        state.merge_from(&b);

        prop_assert_eq!(
            state.firmware_version,
            expected_axis(base.firmware_version, a.firmware_version, b.firmware_version)
        );
        prop_assert_eq!(state.queue_report, b.queue_report.or(a.queue_report).or(base.queue_report));
        prop_assert_eq!(
            &state.machine_position,
            &expected_table(&base.machine_position, &a.machine_position, &b.machine_position)
        );
        prop_assert_eq!(
            &state.working_position,
            &expected_table(&base.working_position, &a.working_position, &b.working_position)
        );
        prop_assert_eq!(
            &state.offset_g92,
            &expected_table(&base.offset_g92, &a.offset_g92, &b.offset_g92)
        );

        let line = |s: &MachineState| s.status_report.as_ref().and_then(|sr| sr.line_number);
        prop_assert_eq!(line(&state), line(&b).or(line(&a)).or(line(&base)));
        prop_assert_eq!(
            state.coordinate_system(),
            b.coordinate_system().or(a.coordinate_system()).or(base.coordinate_system())
        );
    }

    #[test]
    fn empty_update_changes_nothing(base in machine_state()) {
        let mut state = base.clone();
        state.merge_from(&MachineState::default());
        prop_assert_eq!(state, base);
    }
}

#[test]
fn machine_position_then_working_position_keeps_both() {
    let mut state = MachineState::default();
    let first: MachineState =
        serde_json::from_str(r#"{"mpo":{"x":3.0,"y":0,"z":0}}"#).unwrap();
    let second: MachineState =
        serde_json::from_str(r#"{"pos":{"x":1.0,"y":2.0,"z":0}}"#).unwrap();
    state.merge_from(&first);
    state.merge_from(&second);
    assert_eq!(state.machine_position, Some(AxisTable::xyz(3.0, 0.0, 0.0)));
    assert_eq!(state.working_position, Some(AxisTable::xyz(1.0, 2.0, 0.0)));
}
