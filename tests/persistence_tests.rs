use parkour::error::ConfigError;
use parkour::movement::presets::{default_graph, AIRBORNE, GROUNDED};
use parkour::movement::{
    MachineData, MovementStateMachine, OptionRegistry, RequestTag, StateId, GRAPH_FORMAT_VERSION,
};
use parkour::settings::MovementSettings;

fn stock_data() -> MachineData {
    default_graph(OptionRegistry::builtin(), MovementSettings::default())
        .unwrap()
        .to_data()
}

fn load(data: &MachineData) -> Result<MovementStateMachine, ConfigError> {
    MovementStateMachine::from_data(data, OptionRegistry::builtin(), MovementSettings::default())
}

#[test]
fn round_trip_keeps_states_transitions_and_priorities() {
    let original = default_graph(OptionRegistry::builtin(), MovementSettings::default()).unwrap();
    let data = original.to_data();
    assert_eq!(data.version, GRAPH_FORMAT_VERSION);
    assert_eq!(data.states.iter().filter(|s| s.is_initial).count(), 1);

    let loaded = load(&data).unwrap();
    assert_eq!(loaded.to_data(), data);
    assert_eq!(loaded.states().count(), original.states().count());

    let transitions = |m: &MovementStateMachine| -> usize {
        m.states().map(|s| s.transitions().len()).sum()
    };
    assert_eq!(transitions(&loaded), transitions(&original));

    let airborne = loaded.states().find(|s| s.name() == AIRBORNE).unwrap();
    assert_eq!(airborne.priority_of(RequestTag::WallGrab), -1);
}

#[test]
fn round_trip_keeps_priority_order_when_it_differs_from_option_order() {
    let mut m = MovementStateMachine::new(OptionRegistry::builtin(), MovementSettings::default());
    let a = m.add_state("A");
    let b = m.add_state("B");
    m.set_initial_state(a).unwrap();
    m.set_request_priority(a, RequestTag::Land, 5).unwrap();
    m.add_movement_option(a, "jump").unwrap();
    m.add_transition(a, b, RequestTag::Jump).unwrap();

    let data = m.to_data();
    let loaded = load(&data).unwrap();
    assert_eq!(loaded.to_data(), data);

    let order: Vec<(RequestTag, i32)> = loaded
        .state(a)
        .unwrap()
        .priorities()
        .iter()
        .map(|p| (p.request, p.priority))
        .collect();
    assert_eq!(order, vec![(RequestTag::Land, 5), (RequestTag::Jump, 6)]);
}

#[test]
fn to_json_output_parses_back() {
    let data = stock_data();
    let text = data.to_json().unwrap();
    assert_eq!(MachineData::from_json(&text, "inline").unwrap(), data);
}

#[test]
fn loaded_graph_starts_in_its_initial_state() {
    let mut loaded = load(&stock_data()).unwrap();
    loaded.start().unwrap();
    assert_eq!(loaded.current_state().unwrap().name(), GROUNDED);
}

#[test]
fn new_states_never_reuse_loaded_ids() {
    let mut loaded = load(&stock_data()).unwrap();
    let max = loaded.states().map(|s| s.id()).max().unwrap();
    let fresh = loaded.add_state("Sliding");
    assert!(fresh > max);
}

#[test]
fn file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");

    let data = stock_data();
    data.save(&path).unwrap();
    let read = MachineData::load(&path).unwrap();
    assert_eq!(read, data);
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match MachineData::load(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = MachineData::from_json("{ \"version\": 1, ", "inline").unwrap_err();
    assert!(matches!(err, ConfigError::Json { context, .. } if context == "inline"));
}

#[test]
fn unknown_request_name_is_rejected() {
    let mut data = stock_data();
    data.states[0].transitions[0].request = "Teleport".to_string();
    let err = load(&data).err().unwrap();
    assert!(matches!(err, ConfigError::UnknownRequest(name) if name == "Teleport"));
}

#[test]
fn unknown_option_kind_is_rejected() {
    let mut data = stock_data();
    data.states[0].options.push("hover".to_string());
    let err = load(&data).err().unwrap();
    assert!(matches!(err, ConfigError::UnknownOption(kind) if kind == "hover"));
}

#[test]
fn dangling_transition_target_is_rejected() {
    let mut data = stock_data();
    data.states[0].transitions[0].target = StateId(99);
    let err = load(&data).err().unwrap();
    assert!(matches!(err, ConfigError::UnresolvedState { to, .. } if to == StateId(99)));
}

#[test]
fn transition_listed_under_the_wrong_state_is_rejected() {
    let mut data = stock_data();
    let owner = data.states[0].id;
    data.states[0].transitions[0].source = StateId(3);
    let err = load(&data).err().unwrap();
    assert!(matches!(
        err,
        ConfigError::MismatchedSource { owner: o, claimed } if o == owner && claimed == StateId(3)
    ));
}

#[test]
fn initial_state_must_be_unique() {
    let mut data = stock_data();
    for state in &mut data.states {
        state.is_initial = true;
    }
    let count = data.states.len();
    let err = load(&data).err().unwrap();
    assert!(matches!(err, ConfigError::MultipleInitialStates { count: c } if c == count));

    for state in &mut data.states {
        state.is_initial = false;
    }
    assert!(matches!(load(&data).err().unwrap(), ConfigError::NoInitialState));
}

#[test]
fn duplicate_state_ids_are_rejected() {
    let mut data = stock_data();
    let mut copy = data.states[1].clone();
    copy.is_initial = false;
    copy.id = data.states[0].id;
    for transition in &mut copy.transitions {
        transition.source = copy.id;
    }
    data.states.push(copy);
    let err = load(&data).err().unwrap();
    assert!(matches!(err, ConfigError::DuplicateState(id) if id == data.states[0].id));
}
