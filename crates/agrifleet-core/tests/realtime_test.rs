#![allow(clippy::unwrap_used)]
// End-to-end tests for the poll loops: service -> dispatcher -> stores,
// wired through a FleetSession against a wiremock backend. Poll cadence
// is shortened so the loops tick many times within the test window.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agrifleet_api::InMemoryTokenStore;
use agrifleet_core::model::MissionStatus;
use agrifleet_core::session::{FleetConfig, FleetSession};
use agrifleet_core::sync::{SyncIntervals, Topic};

fn robot_json(battery: f64) -> Value {
    json!({
        "id": "robot-1",
        "name": "Rover 1",
        "type": "ground",
        "status": "active",
        "position": { "lat": 52.0, "lng": 5.0 },
        "battery": battery,
        "lastUpdate": "2025-06-01T00:00:00Z"
    })
}

fn telemetry_json(battery: f64) -> Value {
    json!({
        "timestamp": "2025-06-01T00:01:00Z",
        "robotId": "robot-1",
        "position": { "lat": 52.5, "lng": 5.5 },
        "battery": { "level": battery, "voltage": 11.1, "current": 2.0, "temperature": 31.0 },
        "system": { "cpu": 40.0, "memory": 60.0, "temperature": 45.0, "uptime": 3600 },
        "communication": { "signalStrength": 80.0, "latency": 40.0, "packetsLost": 2 },
        "autopilot": { "mode": "AUTO", "armed": true, "gpsStatus": 3, "satelliteCount": 12 }
    })
}

fn active_mission_json() -> Value {
    json!({
        "id": "mission-001",
        "name": "North field survey",
        "description": "",
        "type": "survey",
        "status": "active",
        "assignedRobot": "robot-1",
        "waypoints": [],
        "parameters": {
            "altitude": 10.0, "speed": 2.0, "overlap": 70.0,
            "pattern": "grid", "safetyRadius": 50.0
        },
        "progress": 40.0,
        "estimatedTime": 1800,
        "fieldArea": "field-001",
        "priority": "medium",
        "createdAt": "2025-06-01T00:00:00Z",
        "createdBy": "operator"
    })
}

fn alert_json() -> Value {
    json!({
        "id": "alert-9",
        "robotId": "robot-1",
        "type": "battery",
        "severity": "warning",
        "title": "Low battery",
        "message": "Battery below 25%",
        "timestamp": "2025-06-01T00:00:00Z",
        "acknowledged": false
    })
}

fn fast_intervals() -> SyncIntervals {
    SyncIntervals {
        robots: Duration::from_millis(25),
        telemetry: Duration::from_millis(25),
        alerts: Duration::from_millis(25),
        missions: Duration::from_millis(25),
    }
}

fn session_for(server: &MockServer) -> FleetSession {
    let mut config = FleetConfig::new(Url::parse(&server.uri()).unwrap());
    config.intervals = fast_intervals();
    FleetSession::new(&config, Arc::new(InMemoryTokenStore::new())).unwrap()
}

#[tokio::test]
async fn poll_loops_feed_the_stores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/robots/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([robot_json(80.0)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/missions/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([active_mission_json()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert_json()])))
        .mount(&server)
        .await;
    // Telemetry endpoint intentionally absent: that loop fails every tick
    // and the others must keep going regardless.

    let session = session_for(&server);
    session.start();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(session.robots().robot_count(), 1);
    let missions = session.missions().active_missions();
    assert_eq!(missions.len(), 1);
    assert_eq!(missions[0].status, MissionStatus::Active);
    assert_eq!(session.alerts().unacknowledged_count(), 1);

    session.shutdown();
}

#[tokio::test]
async fn repeated_alert_polls_do_not_duplicate_alerts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert_json()])))
        .mount(&server)
        .await;

    let session = session_for(&server);
    session.start();
    // Many poll windows: the same alert id keeps coming back.
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.shutdown();

    assert_eq!(session.alerts().alerts().len(), 1);
    assert_eq!(session.alerts().unacknowledged_count(), 1);
}

#[tokio::test]
async fn telemetry_loop_updates_the_robot_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/robots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([robot_json(80.0)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/telemetry/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([telemetry_json(55.0)])))
        .mount(&server)
        .await;
    // No /api/robots/status: only the telemetry loop touches the robot.

    let session = session_for(&server);
    session.robots().fetch_robots().await.unwrap();
    session.start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    session.shutdown();

    let robot = session.robots().robot_by_id("robot-1").unwrap();
    assert!((robot.battery - 55.0).abs() < f64::EPSILON);
    assert!((robot.position.lat - 52.5).abs() < f64::EPSILON);
    assert!(robot.telemetry.is_some());
}

#[tokio::test]
async fn shutdown_stops_ticks_and_releases_subscriptions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert_json()])))
        .mount(&server)
        .await;

    let session = session_for(&server);
    session.start();
    assert!(session.is_polling());
    assert_eq!(session.dispatcher().subscriber_count(Topic::Robots), 1);
    assert_eq!(session.dispatcher().subscriber_count(Topic::Alerts), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    session.shutdown();

    assert!(!session.is_polling());
    // Dispatcher-held callback references are released on teardown.
    assert_eq!(session.dispatcher().subscriber_count(Topic::Robots), 0);
    assert_eq!(session.dispatcher().subscriber_count(Topic::Telemetry), 0);
    assert_eq!(session.dispatcher().subscriber_count(Topic::Alerts), 0);
    assert_eq!(session.dispatcher().subscriber_count(Topic::Missions), 0);

    // No further ticks land after shutdown.
    let alerts_after_stop = session.alerts().alerts().len();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(session.alerts().alerts().len(), alerts_after_stop);
}

#[tokio::test]
async fn double_start_does_not_double_subscribe() {
    let server = MockServer::start().await;
    let session = session_for(&server);

    session.start();
    session.start();

    assert_eq!(session.dispatcher().subscriber_count(Topic::Robots), 1);
    assert_eq!(session.dispatcher().subscriber_count(Topic::Missions), 1);
    session.shutdown();
}

#[tokio::test]
async fn prime_loads_every_resource_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/robots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([robot_json(80.0)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/missions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [active_mission_json()],
            "total": 1, "page": 1, "limit": 50,
            "hasNext": false, "hasPrev": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [alert_json()],
            "total": 1, "page": 1, "limit": 50,
            "hasNext": false, "hasPrev": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    // /api/status is absent: prime tolerates partial failure and the
    // system store records it.

    let session = session_for(&server);
    session.prime().await;

    assert_eq!(session.robots().robot_count(), 1);
    assert_eq!(session.missions().missions().len(), 1);
    assert_eq!(session.alerts().alerts().len(), 1);
    assert!(session.system().error().borrow().is_some());
}
