//! # Starter Programs
//!
//! The ready-made workflows offered by the editor's template menu, built
//! directly as program graphs.

use crate::error::Result;
use crate::graph::{BlockId, Mutation, ProgramGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Monitoring,
    Alert,
    Maintenance,
    Control,
    DataProcessing,
    MlPrediction,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Monitoring,
        Preset::Alert,
        Preset::Maintenance,
        Preset::Control,
        Preset::DataProcessing,
        Preset::MlPrediction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Monitoring => "monitoring",
            Preset::Alert => "alert",
            Preset::Maintenance => "maintenance",
            Preset::Control => "control",
            Preset::DataProcessing => "data_processing",
            Preset::MlPrediction => "ml_prediction",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.name() == name)
    }

    pub fn build(self) -> Result<ProgramGraph> {
        let mut b = Builder::new(self.name());
        match self {
            Preset::Monitoring => monitoring(&mut b)?,
            Preset::Alert => alert(&mut b)?,
            Preset::Maintenance => maintenance(&mut b)?,
            Preset::Control => control(&mut b)?,
            Preset::DataProcessing => data_processing(&mut b)?,
            Preset::MlPrediction => ml_prediction(&mut b)?,
        }
        Ok(b.graph)
    }
}

/// while True: read temperature and pressure, log them, wait 5 seconds.
fn monitoring(b: &mut Builder) -> Result<()> {
    let while_block = b.block("controls_whileUntil", &[("MODE", "WHILE")])?;
    let forever = b.block("logic_boolean", &[("BOOL", "TRUE")])?;
    b.value(while_block, "BOOL", forever)?;

    let temperature = b.block("smartx_read_temperature", &[("UNIT", "CELSIUS")])?;
    let set_temperature = b.set("temperature", temperature)?;
    let pressure = b.block("smartx_read_pressure", &[])?;
    let set_pressure = b.set("pressure", pressure)?;

    let parts = [
        b.text("Temp: ")?,
        b.get("temperature")?,
        b.text("\u{b0}C, Pressure: ")?,
        b.get("pressure")?,
    ];
    let join = b.list_like("text_join", &parts)?;
    let log = b.block("smartx_log_event", &[])?;
    b.value(log, "EVENT", join)?;

    let wait = b.block("smartx_wait_seconds", &[])?;
    let five = b.number("5")?;
    b.value(wait, "SECONDS", five)?;

    b.chain(&[set_temperature, set_pressure, log, wait])?;
    b.graph.connect_statement(while_block, "DO", set_temperature)
}

/// Tiered temperature alerting with an else branch.
fn alert(b: &mut Builder) -> Result<()> {
    let if_block = b.block("controls_if", &[])?;
    b.graph.set_mutation(if_block, Mutation::branches(1, true))?;

    let critical_temp = b.block("smartx_read_temperature", &[("UNIT", "CELSIUS")])?;
    let ninety = b.number("90")?;
    let critical = b.compare("GT", critical_temp, ninety)?;
    b.value(if_block, "IF0", critical)?;

    let critical_alert = b.alert("CRITICAL", "Critical temperature exceeded!")?;
    let stop = b.block("smartx_control_machine", &[("ACTION", "EMERGENCY")])?;
    b.chain(&[critical_alert, stop])?;
    b.graph.connect_statement(if_block, "DO0", critical_alert)?;

    let high_temp = b.block("smartx_read_temperature", &[("UNIT", "CELSIUS")])?;
    let eighty = b.number("80")?;
    let high = b.compare("GT", high_temp, eighty)?;
    b.value(if_block, "IF1", high)?;
    let high_alert = b.alert("HIGH", "High temperature warning!")?;
    b.graph.connect_statement(if_block, "DO1", high_alert)?;

    let normal = b.log_event("Temperature normal")?;
    b.graph.connect_statement(if_block, "ELSE", normal)
}

/// Schedule maintenance from runtime hours and vibration.
fn maintenance(b: &mut Builder) -> Result<()> {
    let hours = b.number("500")?;
    let set_hours = b.set("runtime_hours", hours)?;
    let vibration = b.block("smartx_read_vibration", &[])?;
    let set_vibration = b.set("vibration_level", vibration)?;

    let if_block = b.block("controls_if", &[])?;
    b.graph.set_mutation(if_block, Mutation::branches(1, false))?;

    let runtime = b.get("runtime_hours")?;
    let limit = b.number("480")?;
    let overdue = b.compare("GT", runtime, limit)?;
    let level = b.get("vibration_level")?;
    let threshold = b.number("0.8")?;
    let shaking = b.compare("GT", level, threshold)?;
    let either = b.block("logic_operation", &[("OP", "OR")])?;
    b.value(either, "A", overdue)?;
    b.value(either, "B", shaking)?;
    b.value(if_block, "IF0", either)?;

    let schedule = b.block("smartx_schedule_maintenance", &[])?;
    let day = b.number("24")?;
    b.value(schedule, "HOURS", day)?;
    let notify = b.block("smartx_send_notification", &[])?;
    let urgent = b.text("Urgent maintenance required")?;
    b.value(notify, "MESSAGE", urgent)?;
    b.chain(&[schedule, notify])?;
    b.graph.connect_statement(if_block, "DO0", schedule)?;

    let runtime = b.get("runtime_hours")?;
    let soon = b.number("400")?;
    let due_soon = b.compare("GT", runtime, soon)?;
    b.value(if_block, "IF1", due_soon)?;
    let note = b.log_event("Maintenance due soon")?;
    b.graph.connect_statement(if_block, "DO1", note)?;

    b.chain(&[set_hours, set_vibration, if_block])
}

/// React to system efficiency computed from power draw.
fn control(b: &mut Builder) -> Result<()> {
    let power = b.block("smartx_read_power", &[])?;
    let thousand = b.number("1000")?;
    let ratio = b.block("math_arithmetic", &[("OP", "DIVIDE")])?;
    b.value(ratio, "A", power)?;
    b.value(ratio, "B", thousand)?;
    let set_efficiency = b.set("system_efficiency", ratio)?;

    let if_block = b.block("controls_if", &[])?;
    b.graph.set_mutation(if_block, Mutation::branches(2, false))?;

    let branches = [
        ("LT", "0.6"),
        ("LT", "0.8"),
        ("GT", "0.95"),
    ];
    for (i, (op, limit)) in branches.iter().enumerate() {
        let efficiency = b.get("system_efficiency")?;
        let limit = b.number(limit)?;
        let condition = b.compare(op, efficiency, limit)?;
        b.value(if_block, &format!("IF{}", i), condition)?;
    }

    let reset = b.block("smartx_control_machine", &[("ACTION", "RESET")])?;
    let reset_alert = b.alert("MEDIUM", "System reset due to low efficiency")?;
    b.chain(&[reset, reset_alert])?;
    b.graph.connect_statement(if_block, "DO0", reset)?;

    let below = b.log_event("Efficiency below optimal range")?;
    b.graph.connect_statement(if_block, "DO1", below)?;
    let optimal = b.log_event("Optimal efficiency achieved")?;
    b.graph.connect_statement(if_block, "DO2", optimal)?;

    b.chain(&[set_efficiency, if_block])
}

/// Collect readings, filter, average and store.
fn data_processing(b: &mut Builder) -> Result<()> {
    let readings = [
        b.block("smartx_read_temperature", &[("UNIT", "CELSIUS")])?,
        b.block("smartx_read_pressure", &[])?,
        b.block("smartx_read_humidity", &[])?,
    ];
    let list = b.list_like("lists_create_with", &readings)?;
    let set_data = b.set("sensor_data", list)?;

    let filter = b.block("smartx_filter_data", &[])?;
    let data = b.get("sensor_data")?;
    b.value(filter, "DATA", data)?;
    let set_filtered = b.set("filtered_data", filter)?;

    let average = b.block("smartx_calculate_average", &[])?;
    let filtered = b.get("filtered_data")?;
    b.value(average, "DATA", filtered)?;
    let set_average = b.set("average", average)?;

    let update = b.block("smartx_update_database", &[])?;
    let value = b.get("average")?;
    b.value(update, "DATA", value)?;

    b.chain(&[set_data, set_filtered, set_average, update])
}

/// Predict failure probability and act when it is high.
fn ml_prediction(b: &mut Builder) -> Result<()> {
    let readings = [
        b.block("smartx_read_temperature", &[("UNIT", "CELSIUS")])?,
        b.block("smartx_read_vibration", &[])?,
        b.block("smartx_read_pressure", &[])?,
        b.block("smartx_read_power", &[])?,
    ];
    let list = b.list_like("lists_create_with", &readings)?;
    let set_readings = b.set("sensor_readings", list)?;

    let predict = b.block("smartx_predict_failure", &[("MODEL", "NN")])?;
    let input = b.get("sensor_readings")?;
    b.value(predict, "INPUT_DATA", input)?;
    let set_probability = b.set("failure_probability", predict)?;

    let if_block = b.block("controls_if", &[])?;
    let probability = b.get("failure_probability")?;
    let threshold = b.number("0.7")?;
    let risky = b.compare("GT", probability, threshold)?;
    b.value(if_block, "IF0", risky)?;

    let warn = b.alert("HIGH", "Predicted equipment failure risk is high!")?;
    let schedule = b.block("smartx_schedule_maintenance", &[])?;
    let day = b.number("24")?;
    b.value(schedule, "HOURS", day)?;
    b.chain(&[warn, schedule])?;
    b.graph.connect_statement(if_block, "DO0", warn)?;

    b.chain(&[set_readings, set_probability, if_block])
}

/// Shorthand for assembling preset graphs.
struct Builder {
    graph: ProgramGraph,
}

impl Builder {
    fn new(name: &str) -> Self {
        Self { graph: ProgramGraph::new(name) }
    }

    fn block(&mut self, block_type: &str, fields: &[(&str, &str)]) -> Result<BlockId> {
        let id = self.graph.add_block(block_type);
        for (name, value) in fields {
            self.graph.set_field(id, *name, *value)?;
        }
        Ok(id)
    }

    fn value(&mut self, parent: BlockId, socket: &str, child: BlockId) -> Result<()> {
        self.graph.connect_value(parent, socket, child)
    }

    fn number(&mut self, value: &str) -> Result<BlockId> {
        self.block("math_number", &[("NUM", value)])
    }

    fn text(&mut self, value: &str) -> Result<BlockId> {
        self.block("text", &[("TEXT", value)])
    }

    fn get(&mut self, variable: &str) -> Result<BlockId> {
        self.block("variables_get", &[("VAR", variable)])
    }

    fn set(&mut self, variable: &str, value: BlockId) -> Result<BlockId> {
        let id = self.block("variables_set", &[("VAR", variable)])?;
        self.value(id, "VALUE", value)?;
        Ok(id)
    }

    fn compare(&mut self, op: &str, a: BlockId, b: BlockId) -> Result<BlockId> {
        let id = self.block("logic_compare", &[("OP", op)])?;
        self.value(id, "A", a)?;
        self.value(id, "B", b)?;
        Ok(id)
    }

    fn alert(&mut self, severity: &str, message: &str) -> Result<BlockId> {
        let id = self.block("smartx_send_alert", &[("SEVERITY", severity)])?;
        let text = self.text(message)?;
        self.value(id, "MESSAGE", text)?;
        Ok(id)
    }

    fn log_event(&mut self, message: &str) -> Result<BlockId> {
        let id = self.block("smartx_log_event", &[])?;
        let text = self.text(message)?;
        self.value(id, "EVENT", text)?;
        Ok(id)
    }

    /// `text_join` / `lists_create_with` over `items`.
    fn list_like(&mut self, block_type: &str, items: &[BlockId]) -> Result<BlockId> {
        let id = self.block(block_type, &[])?;
        self.graph.set_mutation(id, Mutation::items(items.len()))?;
        for (i, item) in items.iter().enumerate() {
            self.value(id, &format!("ADD{}", i), *item)?;
        }
        Ok(id)
    }

    fn chain(&mut self, statements: &[BlockId]) -> Result<()> {
        for pair in statements.windows(2) {
            self.graph.connect_next(pair[0], pair[1])?;
        }
        Ok(())
    }
}
