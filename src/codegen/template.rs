//! # Script Template
//!
//! Fixed boilerplate wrapped around the compiled statements: header
//! docstring, imports, the SmartX helper library and a guarded `main()`.
//! Only the header fields and the body vary between compilations.

use super::python_codegen::indent_lines;
use crate::options::CompileOptions;

/// Line present in every generated header.
pub const HEADER_MARKER: &str = "Generated automatically from visual blocks";

/// Entry-point guard closing every generated script.
pub const FOOTER_MARKER: &str = "if __name__ == \"__main__\":";

/// Indentation of the body inside `main()`'s `try:` block.
const BODY_INDENT: &str = "        ";

const IMPORTS: &str = r#"# Core imports
import time
import random
import json
import logging
from datetime import datetime, timedelta
from typing import Any, Dict, List, Optional

# SmartX specific imports
import paho.mqtt.client as mqtt
import requests
from dataclasses import dataclass

# Configure logging
logging.basicConfig(level=logging.INFO, format='%(asctime)s - %(levelname)s - %(message)s')
logger = logging.getLogger(__name__)

@dataclass
class SensorReading:
    """Data class for sensor readings"""
    sensor_type: str
    value: float
    unit: str
    timestamp: datetime
    location: str = "default"
"#;

const SENSOR_LIBRARY: &str = r#"
# SmartX Enhanced Sensor Functions
def read_temperature_sensor(unit='CELSIUS'):
    """Read temperature with unit conversion"""
    base_temp = random.randint(60, 100)
    if unit == 'FAHRENHEIT':
        return (base_temp * 9/5) + 32
    elif unit == 'KELVIN':
        return base_temp + 273.15
    return base_temp

def read_pressure_sensor():
    """Read pressure sensor data"""
    return round(random.uniform(1.0, 2.5), 2)

def read_vibration_sensor():
    """Read vibration sensor data"""
    return round(random.uniform(0.1, 1.0), 2)

def read_humidity_sensor():
    """Read humidity sensor data"""
    return random.randint(30, 70)

def read_power_sensor():
    """Read power consumption data"""
    return round(random.uniform(100, 1000), 2)

def read_flow_sensor():
    """Read flow rate data"""
    return round(random.uniform(10, 100), 2)

def read_level_sensor():
    """Read level sensor data"""
    return round(random.uniform(0, 100), 1)

def read_ph_sensor():
    """Read pH sensor data"""
    return round(random.uniform(6.5, 8.5), 2)

def read_conductivity_sensor():
    """Read conductivity sensor data"""
    return round(random.uniform(100, 1000), 1)

def read_gas_sensor():
    """Read gas concentration data"""
    return round(random.uniform(0, 50), 2)
"#;

const ACTION_LIBRARY: &str = r#"
# Enhanced Action Functions
def send_alert(message, severity='MEDIUM'):
    """Send alert with severity level"""
    logger.warning(f"ALERT [{severity}]: {message}")

def log_event(event):
    """Log event with timestamp"""
    logger.info(f"EVENT [{datetime.now()}]: {event}")

def send_notification(message):
    """Send notification to users"""
    logger.info(f"NOTIFICATION: {message}")

def update_database(data):
    """Update database with new data"""
    logger.info(f"DATABASE UPDATE: {data}")

def trigger_alarm(alarm_type):
    """Trigger system alarm"""
    logger.critical(f"ALARM TRIGGERED: {alarm_type}")

def create_report(report_type):
    """Generate system report"""
    logger.info(f"GENERATING REPORT: {report_type}")

def control_machine(action, duration=None):
    """Control machine with optional duration"""
    if duration:
        logger.info(f"MACHINE CONTROL: {action} for {duration} seconds")
    else:
        logger.info(f"MACHINE CONTROL: {action}")

def schedule_maintenance(hours):
    """Schedule maintenance"""
    schedule_time = datetime.now() + timedelta(hours=hours)
    logger.info(f"MAINTENANCE SCHEDULED: {schedule_time}")
"#;

const DATA_LIBRARY: &str = r#"
# Data Processing Functions
def filter_data(data):
    """Filter data based on conditions"""
    return data

def calculate_average(data):
    """Calculate average of data points"""
    if isinstance(data, list) and data:
        return sum(data) / len(data)
    return 0

def find_anomaly(data):
    """Detect anomalies in data"""
    return random.choice([True, False])

def aggregate_data(data):
    """Aggregate data over time period"""
    return data

def transform_data(data):
    """Transform data format"""
    return data

def validate_data(data):
    """Validate data integrity"""
    return data is not None

# ML/AI Functions
def predict_failure(data, model='NN'):
    """Predict equipment failure probability"""
    return round(random.uniform(0, 1), 3)

def classify_data(data, model='RF'):
    """Classify data into categories"""
    categories = ['normal', 'warning', 'critical']
    return random.choice(categories)

def optimize_process(data, model='SVM'):
    """Optimize process parameters"""
    return {"optimized": True, "improvement": random.uniform(0, 20)}

def detect_pattern(data, model='NN'):
    """Detect patterns in data"""
    return {"pattern_detected": random.choice([True, False])}

def forecast_trend(data, model='LR'):
    """Forecast future trends"""
    return {"trend": random.choice(["increasing", "decreasing", "stable"])}
"#;

const COMMUNICATION_LIBRARY: &str = r#"
# Communication Functions
def mqtt_publish(topic, message):
    """Publish message to MQTT topic"""
    logger.info(f"MQTT PUBLISH: Topic={topic}, Message={message}")

def mqtt_subscribe(topic):
    """Subscribe to MQTT topic"""
    logger.info(f"MQTT SUBSCRIBE: Topic={topic}")
    return f"message_from_{topic}"

def http_request(url, method):
    """Make HTTP request"""
    logger.info(f"HTTP {method}: {url}")
    return {"status": "success"}

def send_email(to, subject, body):
    """Send email notification"""
    logger.info(f"EMAIL: To={to}, Subject={subject}")

def webhook(url, data):
    """Send webhook notification"""
    logger.info(f"WEBHOOK: URL={url}, Data={data}")

# Time and Schedule Functions
def get_timestamp(format_type='ISO'):
    """Get current timestamp in specified format"""
    now = datetime.now()
    if format_type == 'UNIX':
        return int(now.timestamp())
    elif format_type == 'FORMATTED':
        return now.strftime('%Y-%m-%d %H:%M:%S')
    return now.isoformat()

def schedule_task(task_info):
    """Schedule task for future execution"""
    logger.info(f"TASK SCHEDULED: {task_info}")

def check_time_range(time_range):
    """Check if current time is in range"""
    return True

def format_datetime(datetime_str):
    """Format datetime string"""
    return datetime_str
"#;

const MAIN_OPEN: &str = r#"
# Main execution function
def main():
    """Main automation workflow"""
    logger.info("SmartX Enhanced Automation Starting...")

    try:
"#;

const MAIN_CLOSE: &str = r#"
        logger.info("SmartX Automation Completed Successfully")

    except Exception as e:
        logger.error(f"Automation Error: {str(e)}")
        send_alert(f"Automation failed: {str(e)}", severity='CRITICAL')

"#;

/// Wrap a compiled statement body into a complete script.
pub fn render_script(body: &str, options: &CompileOptions) -> String {
    let mut script = String::new();

    script.push_str("#!/usr/bin/env python3\n\"\"\"\n");
    script.push_str(&options.program_title);
    script.push('\n');
    script.push_str(HEADER_MARKER);
    script.push('\n');
    if let Some(timestamp) = &options.timestamp {
        script.push_str(&format!("Timestamp: {}\n", timestamp));
    }
    script.push_str("\"\"\"\n\n");

    script.push_str(IMPORTS);
    script.push_str(SENSOR_LIBRARY);
    script.push_str(ACTION_LIBRARY);
    script.push_str(DATA_LIBRARY);
    script.push_str(COMMUNICATION_LIBRARY);

    script.push_str(MAIN_OPEN);
    if body.trim().is_empty() {
        script.push_str(BODY_INDENT);
        script.push_str("pass\n");
    } else {
        script.push_str(&indent_lines(body, BODY_INDENT));
    }
    script.push_str(MAIN_CLOSE);

    script.push_str(FOOTER_MARKER);
    script.push_str("\n    main()\n");
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_renders_pass() {
        let script = render_script("", &CompileOptions::default());
        assert!(script.starts_with("#!/usr/bin/env python3\n"));
        assert!(script.contains(HEADER_MARKER));
        assert!(script.contains("    try:\n        pass\n"));
        assert!(script.ends_with("if __name__ == \"__main__\":\n    main()\n"));
    }

    #[test]
    fn body_is_indented_into_try_block() {
        let script = render_script("x = 1\nif x:\n    pass\n", &CompileOptions::default());
        assert!(script.contains("    try:\n        x = 1\n        if x:\n            pass\n"));
    }

    #[test]
    fn timestamp_only_when_configured() {
        let plain = render_script("", &CompileOptions::default());
        assert!(!plain.contains("Timestamp:"));

        let stamped = render_script("", &CompileOptions::default().with_timestamp("2025-01-01T00:00:00Z"));
        assert!(stamped.contains("Timestamp: 2025-01-01T00:00:00Z\n"));
    }

    #[test]
    fn library_defines_every_smartx_helper() {
        let script = render_script("", &CompileOptions::default());
        for function in [
            "def read_temperature_sensor(",
            "def read_gas_sensor(",
            "def send_alert(",
            "def control_machine(",
            "def schedule_maintenance(",
            "def forecast_trend(",
            "def webhook(",
            "def format_datetime(",
        ] {
            assert!(script.contains(function), "missing {function}");
        }
    }
}
