//! SmartX domain blocks.
//!
//! Each block maps to one helper function in the generated script's stub
//! library (see `codegen::template`).

use crate::error::Result;
use crate::registry::{
    Arg, BlockRegistry, BlockType, EmitRule, FieldDecl, SocketDecl, ValueKind,
};

/// Sensors without options: `smartx_read_<name>` -> `read_<name>_sensor()`.
const SIMPLE_SENSORS: &[&str] = &[
    "pressure",
    "vibration",
    "humidity",
    "power",
    "flow",
    "level",
    "ph",
    "conductivity",
    "gas",
];

/// Single-argument actions: `(function, socket)`.
const ACTIONS: &[(&str, &str)] = &[
    ("log_event", "EVENT"),
    ("send_notification", "MESSAGE"),
    ("update_database", "DATA"),
    ("trigger_alarm", "ALARM_TYPE"),
    ("create_report", "REPORT_TYPE"),
];

const DATA_PROCESSING: &[&str] = &[
    "filter_data",
    "calculate_average",
    "find_anomaly",
    "aggregate_data",
    "transform_data",
    "validate_data",
];

const MACHINE_LEARNING: &[&str] = &[
    "predict_failure",
    "classify_data",
    "optimize_process",
    "detect_pattern",
    "forecast_trend",
];

/// Multi-argument communication statements: `(function, sockets)`.
const COMMUNICATION: &[(&str, &[&str])] = &[
    ("http_request", &["URL", "METHOD"]),
    ("send_email", &["TO", "SUBJECT", "BODY"]),
    ("webhook", &["URL", "DATA"]),
];

const TIME_HELPERS: &[&str] = &["schedule_task", "check_time_range", "format_datetime"];

pub(super) fn register(registry: &mut BlockRegistry) -> Result<()> {
    register_sensors(registry)?;
    register_actions(registry)?;
    register_data_processing(registry)?;
    register_machine_learning(registry)?;
    register_communication(registry)?;
    register_time(registry)?;
    Ok(())
}

fn register_sensors(registry: &mut BlockRegistry) -> Result<()> {
    registry.register(
        BlockType::expression("smartx_read_temperature", ValueKind::Number).with_field(
            FieldDecl::dropdown(
                "UNIT",
                &[("\u{b0}C", "CELSIUS"), ("\u{b0}F", "FAHRENHEIT"), ("K", "KELVIN")],
            ),
        ),
        EmitRule::call("read_temperature_sensor", vec![Arg::field("UNIT")]),
    )?;

    for sensor in SIMPLE_SENSORS {
        registry.register(
            BlockType::expression(&format!("smartx_read_{sensor}"), ValueKind::Number),
            EmitRule::call(&format!("read_{sensor}_sensor"), Vec::new()),
        )?;
    }
    Ok(())
}

fn register_actions(registry: &mut BlockRegistry) -> Result<()> {
    registry.register(
        BlockType::statement("smartx_send_alert")
            .with_socket(SocketDecl::value("MESSAGE", ValueKind::String))
            .with_field(FieldDecl::dropdown(
                "SEVERITY",
                &[
                    ("low", "LOW"),
                    ("medium", "MEDIUM"),
                    ("high", "HIGH"),
                    ("critical", "CRITICAL"),
                ],
            )),
        EmitRule::call(
            "send_alert",
            vec![Arg::socket("MESSAGE"), Arg::field("SEVERITY").keyword("severity")],
        ),
    )?;

    for (function, socket) in ACTIONS {
        registry.register(
            BlockType::statement(&format!("smartx_{function}"))
                .with_socket(SocketDecl::value(socket, ValueKind::String)),
            EmitRule::call(function, vec![Arg::socket(socket)]),
        )?;
    }

    registry.register(
        BlockType::statement("smartx_control_machine")
            .with_field(FieldDecl::dropdown(
                "ACTION",
                &[
                    ("start", "START"),
                    ("stop", "STOP"),
                    ("pause", "PAUSE"),
                    ("reset", "RESET"),
                    ("maintenance mode", "MAINTENANCE"),
                    ("emergency stop", "EMERGENCY"),
                ],
            ))
            .with_socket(SocketDecl::value("DURATION", ValueKind::Number)),
        EmitRule::call(
            "control_machine",
            vec![
                Arg::field("ACTION"),
                Arg::socket("DURATION").keyword("duration").optional(),
            ],
        ),
    )?;

    registry.register(
        BlockType::statement("smartx_schedule_maintenance")
            .with_socket(SocketDecl::value("HOURS", ValueKind::Number)),
        EmitRule::call("schedule_maintenance", vec![Arg::socket("HOURS")]),
    )?;
    Ok(())
}

fn register_data_processing(registry: &mut BlockRegistry) -> Result<()> {
    for function in DATA_PROCESSING {
        registry.register(
            BlockType::expression(&format!("smartx_{function}"), ValueKind::Any)
                .with_socket(SocketDecl::value("DATA", ValueKind::Any)),
            EmitRule::call(function, vec![Arg::socket("DATA")]),
        )?;
    }
    Ok(())
}

fn register_machine_learning(registry: &mut BlockRegistry) -> Result<()> {
    for function in MACHINE_LEARNING {
        registry.register(
            BlockType::expression(&format!("smartx_{function}"), ValueKind::Any)
                .with_socket(SocketDecl::value("INPUT_DATA", ValueKind::Any))
                .with_field(FieldDecl::dropdown(
                    "MODEL",
                    &[
                        ("neural network", "NN"),
                        ("random forest", "RF"),
                        ("svm", "SVM"),
                        ("linear regression", "LR"),
                    ],
                )),
            EmitRule::call(
                function,
                vec![Arg::socket("INPUT_DATA"), Arg::field("MODEL").keyword("model")],
            ),
        )?;
    }
    Ok(())
}

fn register_communication(registry: &mut BlockRegistry) -> Result<()> {
    registry.register(
        BlockType::statement("smartx_mqtt_publish")
            .with_socket(SocketDecl::value("TOPIC", ValueKind::String))
            .with_socket(SocketDecl::value("MESSAGE", ValueKind::String)),
        EmitRule::call("mqtt_publish", vec![Arg::socket("TOPIC"), Arg::socket("MESSAGE")]),
    )?;
    registry.register(
        BlockType::expression("smartx_mqtt_subscribe", ValueKind::String)
            .with_socket(SocketDecl::value("TOPIC", ValueKind::String)),
        EmitRule::call("mqtt_subscribe", vec![Arg::socket("TOPIC")]),
    )?;

    for (function, sockets) in COMMUNICATION {
        let block = sockets.iter().fold(
            BlockType::statement(&format!("smartx_{function}")),
            |block, socket| block.with_socket(SocketDecl::value(socket, ValueKind::String)),
        );
        let args = sockets.iter().map(|socket| Arg::socket(socket)).collect();
        registry.register(block, EmitRule::call(function, args))?;
    }
    Ok(())
}

fn register_time(registry: &mut BlockRegistry) -> Result<()> {
    registry.register(
        BlockType::statement("smartx_wait_seconds")
            .with_socket(SocketDecl::value("SECONDS", ValueKind::Number)),
        EmitRule::call("time.sleep", vec![Arg::socket("SECONDS")]),
    )?;
    registry.register(
        BlockType::expression("smartx_get_timestamp", ValueKind::String).with_field(
            FieldDecl::dropdown(
                "FORMAT",
                &[("unix", "UNIX"), ("iso", "ISO"), ("formatted", "FORMATTED")],
            ),
        ),
        EmitRule::call("get_timestamp", vec![Arg::field("FORMAT")]),
    )?;

    for function in TIME_HELPERS {
        registry.register(
            BlockType::expression(&format!("smartx_{function}"), ValueKind::Any)
                .with_socket(SocketDecl::value("INPUT", ValueKind::Any)),
            EmitRule::call(function, vec![Arg::socket("INPUT")]),
        )?;
    }
    Ok(())
}
