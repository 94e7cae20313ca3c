use sxbc::codegen::template::{FOOTER_MARKER, HEADER_MARKER};
use sxbc::{
    compile_program, compile_program_with_options, Arg, BlockRegistry, BlockType,
    CompileError, CompileOptions, CompiledProgram, EmitRule, Mutation, Preset, ProgramGraph,
    SocketDecl, ValueKind, Warning, Workspace, ERROR_PLACEHOLDER, PREVIEW_PLACEHOLDER,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn registry() -> BlockRegistry {
    BlockRegistry::standard().expect("standard registry")
}

fn compile(graph: &ProgramGraph) -> CompiledProgram {
    init_tracing();
    compile_program_with_options(graph, &registry(), &CompileOptions::default())
        .expect("compilation failed")
}

fn number(graph: &mut ProgramGraph, value: &str) -> sxbc::BlockId {
    let id = graph.add_block("math_number");
    graph.set_field(id, "NUM", value).unwrap();
    id
}

fn text(graph: &mut ProgramGraph, value: &str) -> sxbc::BlockId {
    let id = graph.add_block("text");
    graph.set_field(id, "TEXT", value).unwrap();
    id
}

fn arithmetic(
    graph: &mut ProgramGraph,
    op: &str,
    a: sxbc::BlockId,
    b: sxbc::BlockId,
) -> sxbc::BlockId {
    let id = graph.add_block("math_arithmetic");
    graph.set_field(id, "OP", op).unwrap();
    graph.connect_value(id, "A", a).unwrap();
    graph.connect_value(id, "B", b).unwrap();
    id
}

/// `x = <expr>` so an expression can be compiled on its own line.
fn assign(graph: &mut ProgramGraph, expr: sxbc::BlockId) -> sxbc::BlockId {
    let set = graph.add_block("variables_set");
    graph.set_field(set, "VAR", "x").unwrap();
    graph.connect_value(set, "VALUE", expr).unwrap();
    set
}

#[test]
fn temperature_alert_end_to_end() {
    let mut graph = ProgramGraph::new("alert");

    let read = graph.add_block("smartx_read_temperature");
    graph.set_field(read, "UNIT", "CELSIUS").unwrap();
    let set = graph.add_block("variables_set");
    graph.set_field(set, "VAR", "temperature").unwrap();
    graph.connect_value(set, "VALUE", read).unwrap();

    let get = graph.add_block("variables_get");
    graph.set_field(get, "VAR", "temperature").unwrap();
    let ninety = number(&mut graph, "90");
    let compare = graph.add_block("logic_compare");
    graph.set_field(compare, "OP", "GT").unwrap();
    graph.connect_value(compare, "A", get).unwrap();
    graph.connect_value(compare, "B", ninety).unwrap();

    let alert = graph.add_block("smartx_send_alert");
    graph.set_field(alert, "SEVERITY", "CRITICAL").unwrap();
    let message = text(&mut graph, "Critical!");
    graph.connect_value(alert, "MESSAGE", message).unwrap();

    let if_block = graph.add_block("controls_if");
    graph.connect_value(if_block, "IF0", compare).unwrap();
    graph.connect_statement(if_block, "DO0", alert).unwrap();
    graph.connect_next(set, if_block).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "temperature = None\n\
         \n\
         temperature = read_temperature_sensor('CELSIUS')\n\
         if temperature > 90:\n    \
         send_alert('Critical!', severity='CRITICAL')\n"
    );
    assert!(program
        .script
        .contains("        temperature = read_temperature_sensor('CELSIUS')\n"));
    assert!(program.script.contains("        if temperature > 90:\n"));
    assert!(program
        .script
        .contains("            send_alert('Critical!', severity='CRITICAL')\n"));
    assert!(program.warnings.is_empty());
    assert_eq!(program.variables, vec!["temperature".to_string()]);
}

#[test]
fn empty_graph_compiles_to_template_only() {
    let graph = ProgramGraph::new("empty");
    let program = compile(&graph);

    assert_eq!(program.body, "");
    assert_eq!(program.preview(), PREVIEW_PLACEHOLDER);
    assert!(program.script.contains(HEADER_MARKER));
    assert!(program.script.contains(FOOTER_MARKER));
    assert!(program.script.contains("    try:\n        pass\n"));
    assert!(program.warnings.is_empty());
}

#[test]
fn compilation_is_deterministic() {
    for preset in Preset::ALL {
        let graph = preset.build().unwrap();
        let first = compile_program(&graph, &registry()).unwrap();
        let second = compile_program(&graph, &registry()).unwrap();
        assert_eq!(first, second, "{}", preset.name());
        assert!(first.contains(HEADER_MARKER));
        assert!(first.trim_end().ends_with("main()"));
    }
}

#[test]
fn disconnected_socket_leaves_empty_argument() {
    let mut graph = ProgramGraph::new("missing");
    let alert = graph.add_block("smartx_send_alert");
    graph.set_field(alert, "SEVERITY", "HIGH").unwrap();

    let program = compile(&graph);
    assert_eq!(program.body, "send_alert(, severity='HIGH')\n");
}

#[test]
fn unset_fields_fall_back_to_declared_defaults() {
    let mut graph = ProgramGraph::new("defaults");
    let read = graph.add_block("smartx_read_temperature");
    assign(&mut graph, read);

    let program = compile(&graph);
    assert!(program.body.contains("x = read_temperature_sensor('CELSIUS')\n"));
}

#[test]
fn empty_statement_socket_becomes_pass() {
    let mut graph = ProgramGraph::new("empty body");
    let repeat = graph.add_block("controls_repeat_ext");
    let three = number(&mut graph, "3");
    graph.connect_value(repeat, "TIMES", three).unwrap();

    let program = compile(&graph);
    assert_eq!(program.body, "for count in range(3):\n    pass\n");
}

#[test]
fn optional_duration_is_dropped_when_disconnected() {
    let mut graph = ProgramGraph::new("machine");
    let stop = graph.add_block("smartx_control_machine");
    graph.set_field(stop, "ACTION", "EMERGENCY").unwrap();
    let start = graph.add_block("smartx_control_machine");
    graph.set_field(start, "ACTION", "START").unwrap();
    let ten = number(&mut graph, "10");
    graph.connect_value(start, "DURATION", ten).unwrap();
    graph.connect_next(stop, start).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "control_machine('EMERGENCY')\ncontrol_machine('START', duration=10)\n"
    );
}

#[test]
fn next_link_cycle_fails_instead_of_hanging() {
    init_tracing();
    let json = r#"{ "name": "loop", "blocks": [
        { "id": "A", "type": "smartx_wait_seconds", "next": "B" },
        { "id": "B", "type": "smartx_wait_seconds", "next": "A" }
    ] }"#;
    let graph = ProgramGraph::from_json(json).unwrap();

    let err = compile_program(&graph, &registry()).unwrap_err();
    assert!(matches!(err, CompileError::CyclicChain(_)), "got {err}");
}

#[test]
fn socket_cycle_reachable_from_root_fails() {
    init_tracing();
    let json = r#"{ "blocks": [
        { "id": "log", "type": "smartx_log_event", "values": { "EVENT": "join" } },
        { "id": "join", "type": "text_join", "values": { "ADD0": "filter" },
          "mutation": { "items": 1 } },
        { "id": "filter", "type": "smartx_filter_data", "values": { "DATA": "join" } }
    ] }"#;
    let graph = ProgramGraph::from_json(json).unwrap();

    let err = compile_program(&graph, &registry()).unwrap_err();
    assert!(matches!(err, CompileError::CyclicChain(_)));
}

#[test]
fn unknown_block_type_fails_whole_compile() {
    init_tracing();
    let mut graph = ProgramGraph::new("unknown");
    let wait = graph.add_block("smartx_wait_seconds");
    let mystery = graph.add_block("mystery_block");
    graph.connect_next(wait, mystery).unwrap();

    let err = compile_program(&graph, &registry()).unwrap_err();
    assert!(matches!(err, CompileError::UnknownType(ref name) if name == "mystery_block"));
}

#[test]
fn arithmetic_parenthesization() {
    let mut graph = ProgramGraph::new("math");

    // (1 + 2) * 3
    let one = number(&mut graph, "1");
    let two = number(&mut graph, "2");
    let sum = arithmetic(&mut graph, "ADD", one, two);
    let three = number(&mut graph, "3");
    let product = arithmetic(&mut graph, "MULTIPLY", sum, three);
    let first = assign(&mut graph, product);

    // 4 * 3, atomic operand stays bare
    let four = number(&mut graph, "4");
    let three = number(&mut graph, "3");
    let plain = arithmetic(&mut graph, "MULTIPLY", four, three);
    let second = assign(&mut graph, plain);

    // 10 - (4 - 1) keeps its grouping
    let ten = number(&mut graph, "10");
    let four = number(&mut graph, "4");
    let one = number(&mut graph, "1");
    let inner = arithmetic(&mut graph, "MINUS", four, one);
    let outer = arithmetic(&mut graph, "MINUS", ten, inner);
    let third = assign(&mut graph, outer);

    // 1 + 2 + 3 needs nothing
    let one = number(&mut graph, "1");
    let two = number(&mut graph, "2");
    let left = arithmetic(&mut graph, "ADD", one, two);
    let three = number(&mut graph, "3");
    let chained = arithmetic(&mut graph, "ADD", left, three);
    let fourth = assign(&mut graph, chained);

    graph.connect_next(first, second).unwrap();
    graph.connect_next(second, third).unwrap();
    graph.connect_next(third, fourth).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "x = None\n\
         \n\
         x = (1 + 2) * 3\n\
         x = 4 * 3\n\
         x = 10 - (4 - 1)\n\
         x = 1 + 2 + 3\n"
    );
}

#[test]
fn logic_and_negation_grouping() {
    let mut graph = ProgramGraph::new("logic");
    let a = graph.add_block("logic_boolean");
    let b = graph.add_block("logic_boolean");
    graph.set_field(b, "BOOL", "FALSE").unwrap();
    let or = graph.add_block("logic_operation");
    graph.set_field(or, "OP", "OR").unwrap();
    graph.connect_value(or, "A", a).unwrap();
    graph.connect_value(or, "B", b).unwrap();

    let c = graph.add_block("logic_boolean");
    let and = graph.add_block("logic_operation");
    graph.set_field(and, "OP", "AND").unwrap();
    graph.connect_value(and, "A", or).unwrap();
    graph.connect_value(and, "B", c).unwrap();

    let not = graph.add_block("logic_negate");
    graph.connect_value(not, "BOOL", and).unwrap();
    assign(&mut graph, not);

    let program = compile(&graph);
    assert!(program.body.contains("x = not ((True or False) and True)\n"));
}

#[test]
fn while_until_negates_condition() {
    let mut graph = ProgramGraph::new("until");
    let until = graph.add_block("controls_whileUntil");
    graph.set_field(until, "MODE", "UNTIL").unwrap();
    let level = graph.add_block("smartx_read_level");
    let full = number(&mut graph, "95");
    let compare = graph.add_block("logic_compare");
    graph.set_field(compare, "OP", "GTE").unwrap();
    graph.connect_value(compare, "A", level).unwrap();
    graph.connect_value(compare, "B", full).unwrap();
    graph.connect_value(until, "BOOL", compare).unwrap();

    let wait = graph.add_block("smartx_wait_seconds");
    let one = number(&mut graph, "1");
    graph.connect_value(wait, "SECONDS", one).unwrap();
    graph.connect_statement(until, "DO", wait).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "while not read_level_sensor() >= 95:\n    time.sleep(1)\n"
    );
}

#[test]
fn nested_bodies_are_indented_per_level() {
    let mut graph = ProgramGraph::new("nested");
    let outer = graph.add_block("controls_whileUntil");
    let forever = graph.add_block("logic_boolean");
    graph.connect_value(outer, "BOOL", forever).unwrap();

    let inner = graph.add_block("controls_if");
    let anomaly = graph.add_block("smartx_find_anomaly");
    let reading = graph.add_block("smartx_read_vibration");
    graph.connect_value(anomaly, "DATA", reading).unwrap();
    graph.connect_value(inner, "IF0", anomaly).unwrap();
    let alarm = graph.add_block("smartx_trigger_alarm");
    let kind = text(&mut graph, "vibration");
    graph.connect_value(alarm, "ALARM_TYPE", kind).unwrap();
    graph.connect_statement(inner, "DO0", alarm).unwrap();
    graph.connect_statement(outer, "DO", inner).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "while True:\n    \
         if find_anomaly(read_vibration_sensor()):\n        \
         trigger_alarm('vibration')\n"
    );
    assert_eq!(
        program.warnings,
        vec![Warning::InfiniteLoop { block: outer }]
    );
}

#[test]
fn floating_expression_root_is_emitted_as_a_line() {
    let mut graph = ProgramGraph::new("floating");
    let topic = text(&mut graph, "plant/line1");
    let subscribe = graph.add_block("smartx_mqtt_subscribe");
    graph.connect_value(subscribe, "TOPIC", topic).unwrap();

    let program = compile(&graph);
    assert_eq!(program.body, "mqtt_subscribe('plant/line1')\n");
}

#[test]
fn blocks_in_undeclared_sockets_are_unreachable() {
    let mut graph = ProgramGraph::new("stray");
    let log = graph.add_block("smartx_log_event");
    let event = text(&mut graph, "started");
    graph.connect_value(log, "EVENT", event).unwrap();
    let stray = text(&mut graph, "lost");
    graph.connect_value(log, "NOT_A_SOCKET", stray).unwrap();

    let program = compile(&graph);
    assert_eq!(program.body, "log_event('started')\n");
    assert_eq!(program.warnings, vec![Warning::Unreachable { blocks: vec![stray] }]);
    assert_eq!(program.warnings[0].to_string(), "1 disconnected blocks found");
}

#[test]
fn statement_block_in_value_socket_is_treated_as_disconnected() {
    let mut graph = ProgramGraph::new("misplaced");
    let publish = graph.add_block("smartx_mqtt_publish");
    let topic = text(&mut graph, "alerts");
    graph.connect_value(publish, "TOPIC", topic).unwrap();
    let wait = graph.add_block("smartx_wait_seconds");
    graph.connect_value(publish, "MESSAGE", wait).unwrap();

    let program = compile(&graph);
    assert_eq!(program.body, "mqtt_publish('alerts', )\n");
    assert!(matches!(program.warnings.as_slice(), [Warning::Unreachable { .. }]));
}

#[test]
fn text_join_and_lists() {
    let mut graph = ProgramGraph::new("join");
    let label = text(&mut graph, "Flow: ");
    let flow = graph.add_block("smartx_read_flow");
    let join = graph.add_block("text_join");
    graph.set_mutation(join, Mutation::items(2)).unwrap();
    graph.connect_value(join, "ADD0", label).unwrap();
    graph.connect_value(join, "ADD1", flow).unwrap();
    let notify = graph.add_block("smartx_send_notification");
    graph.connect_value(notify, "MESSAGE", join).unwrap();

    let ph = graph.add_block("smartx_read_ph");
    let gas = graph.add_block("smartx_read_gas");
    let list = graph.add_block("lists_create_with");
    graph.set_mutation(list, Mutation::items(3)).unwrap();
    graph.connect_value(list, "ADD0", ph).unwrap();
    graph.connect_value(list, "ADD2", gas).unwrap();
    let set = assign(&mut graph, list);
    graph.connect_next(notify, set).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "x = None\n\
         \n\
         send_notification(str('Flow: ') + str(read_flow_sensor()))\n\
         x = [read_ph_sensor(), , read_gas_sensor()]\n"
    );
}

#[test]
fn variable_names_are_sanitized_and_declared_once() {
    let mut graph = ProgramGraph::new("names");
    let value = number(&mut graph, "1");
    let set = graph.add_block("variables_set");
    graph.set_field(set, "VAR", "motor speed").unwrap();
    graph.connect_value(set, "VALUE", value).unwrap();

    let get = graph.add_block("variables_get");
    graph.set_field(get, "VAR", "motor speed").unwrap();
    let print = graph.add_block("text_print");
    graph.connect_value(print, "TEXT", get).unwrap();
    graph.connect_next(set, print).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "motor_speed = None\n\nmotor_speed = 1\nprint(motor_speed)\n"
    );
}

#[test]
fn clashing_variable_names_stay_distinct() {
    let mut graph = ProgramGraph::new("clash");
    let one = number(&mut graph, "1");
    let spaced = graph.add_block("variables_set");
    graph.set_field(spaced, "VAR", "motor speed").unwrap();
    graph.connect_value(spaced, "VALUE", one).unwrap();

    let two = number(&mut graph, "2");
    let underscored = graph.add_block("variables_set");
    graph.set_field(underscored, "VAR", "motor_speed").unwrap();
    graph.connect_value(underscored, "VALUE", two).unwrap();

    let get = graph.add_block("variables_get");
    graph.set_field(get, "VAR", "motor speed").unwrap();
    let print = graph.add_block("text_print");
    graph.connect_value(print, "TEXT", get).unwrap();

    graph.connect_next(spaced, underscored).unwrap();
    graph.connect_next(underscored, print).unwrap();

    let program = compile(&graph);
    assert_eq!(
        program.body,
        "motor_speed = None\n\
         motor_speed_2 = None\n\
         \n\
         motor_speed = 1\n\
         motor_speed_2 = 2\n\
         print(motor_speed)\n"
    );
    assert_eq!(program.variables, vec!["motor_speed", "motor_speed_2"]);
}

#[test]
fn non_ascii_variable_names_are_kept() {
    let mut graph = ProgramGraph::new("unicode");
    let read = graph.add_block("smartx_read_temperature");
    let set = graph.add_block("variables_set");
    graph.set_field(set, "VAR", "température").unwrap();
    graph.connect_value(set, "VALUE", read).unwrap();

    let program = compile(&graph);
    assert!(program
        .body
        .ends_with("température = read_temperature_sensor('CELSIUS')\n"));
}

#[test]
fn large_integers_are_emitted_exactly() {
    let mut graph = ProgramGraph::new("big");
    let big = number(&mut graph, "12345678901234567890");
    assign(&mut graph, big);

    let program = compile(&graph);
    assert!(program.body.ends_with("x = 12345678901234567890\n"));
}

#[test]
fn block_shared_by_two_sockets_fails() {
    init_tracing();
    let json = r#"{ "blocks": [
        { "id": "log", "type": "smartx_log_event", "values": { "EVENT": "join" } },
        { "id": "join", "type": "text_join", "values": { "ADD0": "t", "ADD1": "t" },
          "mutation": { "items": 2 } },
        { "id": "t", "type": "text", "fields": { "TEXT": "twice" } }
    ] }"#;
    let graph = ProgramGraph::from_json(json).unwrap();

    let err = compile_program(&graph, &registry()).unwrap_err();
    assert!(matches!(err, CompileError::SharedBlock(ref block) if block == "'t' (text)"));
}

#[test]
fn shared_ladder_fails_without_blowing_up() {
    init_tracing();
    let depth = 40;
    let mut blocks = vec![
        r#"{ "id": "root", "type": "variables_set", "fields": { "VAR": "x" }, "values": { "VALUE": "op0" } }"#
            .to_string(),
    ];
    for i in 0..depth {
        let next = if i + 1 == depth { "leaf".to_string() } else { format!("op{}", i + 1) };
        blocks.push(format!(
            r#"{{ "id": "op{i}", "type": "logic_operation", "values": {{ "A": "{next}", "B": "{next}" }} }}"#
        ));
    }
    blocks.push(r#"{ "id": "leaf", "type": "logic_boolean" }"#.to_string());
    let json = format!(r#"{{ "blocks": [{}] }}"#, blocks.join(","));
    let graph = ProgramGraph::from_json(&json).unwrap();

    let err = compile_program(&graph, &registry()).unwrap_err();
    assert!(matches!(err, CompileError::SharedBlock(_)));
}

#[test]
fn shared_block_reached_once_compiles_with_warning() {
    init_tracing();
    let json = r#"{ "blocks": [
        { "id": "first", "type": "smartx_log_event", "values": { "EVENT": "t" } },
        { "id": "second", "type": "smartx_log_event", "values": { "EXTRA": "t" } },
        { "id": "t", "type": "text", "fields": { "TEXT": "shared" } }
    ] }"#;
    let graph = ProgramGraph::from_json(json).unwrap();
    let shared = graph.blocks().find(|b| b.key == "t").unwrap().id;

    let program =
        compile_program_with_options(&graph, &registry(), &CompileOptions::default()).unwrap();
    assert_eq!(program.body, "log_event('shared')\nlog_event()\n");
    assert_eq!(program.warnings, vec![Warning::SharedBlock { block: shared }]);
    assert_eq!(
        program.warnings[0].to_string(),
        format!("Block {} is connected to more than one parent", shared)
    );
}

#[test]
fn options_control_indent_and_declarations() {
    init_tracing();
    let graph = Preset::Alert.build().unwrap();
    let options = CompileOptions {
        indent: "  ".to_string(),
        declare_variables: false,
        ..CompileOptions::default()
    }
    .with_timestamp("2025-06-11T21:58:53Z");

    let program = compile_program_with_options(&graph, &registry(), &options).unwrap();
    assert!(program.body.contains("\n  send_alert('High temperature warning!', severity='HIGH')\n"));
    assert!(program.script.contains("Timestamp: 2025-06-11T21:58:53Z\n"));
}

#[test]
fn alert_preset_body() {
    let graph = Preset::Alert.build().unwrap();
    let program = compile(&graph);
    assert_eq!(
        program.body,
        "if read_temperature_sensor('CELSIUS') > 90:\n    \
         send_alert('Critical temperature exceeded!', severity='CRITICAL')\n    \
         control_machine('EMERGENCY')\n\
         elif read_temperature_sensor('CELSIUS') > 80:\n    \
         send_alert('High temperature warning!', severity='HIGH')\n\
         else:\n    \
         log_event('Temperature normal')\n"
    );
}

#[test]
fn monitoring_preset_body() {
    let graph = Preset::Monitoring.build().unwrap();
    let program = compile(&graph);
    assert_eq!(
        program.body,
        "temperature = None\n\
         pressure = None\n\
         \n\
         while True:\n    \
         temperature = read_temperature_sensor('CELSIUS')\n    \
         pressure = read_pressure_sensor()\n    \
         log_event(str('Temp: ') + str(temperature) + str('\u{b0}C, Pressure: ') + str(pressure))\n    \
         time.sleep(5)\n"
    );
    assert!(matches!(program.warnings.as_slice(), [Warning::InfiniteLoop { .. }]));
}

#[test]
fn maintenance_and_control_presets() {
    let maintenance = compile(&Preset::Maintenance.build().unwrap());
    assert!(maintenance
        .body
        .contains("if runtime_hours > 480 or vibration_level > 0.8:\n"));
    assert!(maintenance.body.contains("elif runtime_hours > 400:\n"));

    let control = compile(&Preset::Control.build().unwrap());
    assert!(control
        .body
        .contains("system_efficiency = read_power_sensor() / 1000\n"));
    assert!(control.body.contains("elif system_efficiency > 0.95:\n"));
}

#[test]
fn data_and_ml_presets() {
    let data = compile(&Preset::DataProcessing.build().unwrap());
    assert!(data.body.contains(
        "sensor_data = [read_temperature_sensor('CELSIUS'), read_pressure_sensor(), read_humidity_sensor()]\n"
    ));
    assert!(data.body.ends_with("update_database(average)\n"));

    let ml = compile(&Preset::MlPrediction.build().unwrap());
    assert!(ml
        .body
        .contains("failure_probability = predict_failure(sensor_readings, model='NN')\n"));
    assert!(ml.body.contains("    schedule_maintenance(24)\n"));
}

#[test]
fn json_round_trip_preserves_output() {
    for preset in Preset::ALL {
        let graph = preset.build().unwrap();
        let reloaded = ProgramGraph::from_json(&graph.to_json().unwrap()).unwrap();
        assert_eq!(
            compile_program(&graph, &registry()).unwrap(),
            compile_program(&reloaded, &registry()).unwrap()
        );
    }
}

#[test]
fn custom_registry_isolated_from_standard_blocks() {
    init_tracing();
    let mut registry = BlockRegistry::new();
    registry
        .register(
            BlockType::statement("beep").with_socket(SocketDecl::value("TIMES", ValueKind::Number)),
            EmitRule::call("buzzer.beep", vec![Arg::socket("TIMES")]),
        )
        .unwrap();

    let err = registry
        .register(
            BlockType::statement("beep"),
            EmitRule::call("buzzer.beep", Vec::new()),
        )
        .unwrap_err();
    assert!(matches!(err, CompileError::DuplicateType(_)));

    let mut graph = ProgramGraph::new("custom");
    graph.add_block("beep");
    let script = compile_program(&graph, &registry).unwrap();
    assert!(script.contains("        buzzer.beep()\n"));

    graph.add_block("smartx_wait_seconds");
    assert!(matches!(
        compile_program(&graph, &registry),
        Err(CompileError::UnknownType(_))
    ));
}

#[test]
fn workspace_recompiles_after_every_edit() {
    init_tracing();
    let mut workspace = Workspace::new("live", registry(), CompileOptions::default());
    assert_eq!(workspace.preview(), PREVIEW_PLACEHOLDER);

    let wait = workspace.edit(|graph| graph.add_block("smartx_wait_seconds"));
    assert_eq!(workspace.preview(), "time.sleep()\n");

    workspace
        .edit(|graph| {
            let seconds = graph.add_block("math_number");
            graph.set_field(seconds, "NUM", "2")?;
            graph.connect_value(wait, "SECONDS", seconds)
        })
        .unwrap();
    assert_eq!(workspace.preview(), "time.sleep(2)\n");
    assert!(workspace.script().contains("        time.sleep(2)\n"));

    let cyclic = ProgramGraph::from_json(
        r#"{ "blocks": [
            { "id": "a", "type": "smartx_wait_seconds", "next": "b" },
            { "id": "b", "type": "smartx_wait_seconds", "next": "a" }
        ] }"#,
    )
    .unwrap();
    workspace.load(cyclic);
    assert!(workspace.output().is_err());
    assert_eq!(workspace.script(), ERROR_PLACEHOLDER);

    workspace.clear();
    assert!(workspace.graph().is_empty());
    assert_eq!(workspace.preview(), PREVIEW_PLACEHOLDER);
}

#[test]
fn stats_reflect_block_count_and_lines() {
    let graph = Preset::Maintenance.build().unwrap();
    let program = compile(&graph);
    assert_eq!(program.stats.blocks, graph.len());
    assert_eq!(
        program.stats.lines,
        program.script.lines().filter(|l| !l.trim().is_empty()).count()
    );
    assert_eq!(program.stats.complexity, sxbc::Complexity::Moderate);
}
