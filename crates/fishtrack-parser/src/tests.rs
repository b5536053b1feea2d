use crate::errors::ParserError;
use crate::registry::parse_detections;

fn csv_bytes(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

#[test]
fn parses_vliz_v1_happy_path() {
    let csv = "Date(UTC),Time(UTC),Receiver,Transmitter,TransmitterName,TransmitterSerial,SensorValue,SensorUnit,StationName,Latitude,Longitude\n\
2015-01-01,10:32:42,VR92S,29JEQ,,,,,as-43,,\n";
    let detections = parse_detections(&csv_bytes(csv), None).expect("should parse");
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].transmitter_id, "29JEQ");
    assert_eq!(detections[0].station_name, "as-43");
    assert_eq!(detections[0].receiver_id, "VR92S");
}

#[test]
fn fails_vliz_v1_on_wrong_date_format() {
    let csv = "Date(UTC),Time(UTC),Receiver,Transmitter,TransmitterName,TransmitterSerial,SensorValue,SensorUnit,StationName,Latitude,Longitude\n\
15-01-01,10h 42,VR92S,29JEQ,,,,,as-43,,\n";
    let err = parse_detections(&csv_bytes(csv), None).unwrap_err();
    assert!(matches!(err, ParserError::BadDateTime { .. }));
}

#[test]
fn fails_vliz_v1_on_bad_station_name() {
    let csv = "Date(UTC),Time(UTC),Receiver,Transmitter,TransmitterName,TransmitterSerial,SensorValue,SensorUnit,StationName,Latitude,Longitude\n\
2015-01-01,10:32:42,VR92S,29JEQ,,,,,VSE49293,,\n";
    let err = parse_detections(&csv_bytes(csv), None).unwrap_err();
    assert!(matches!(err, ParserError::BadStationName { .. }));
}

#[test]
fn station_name_falls_back_to_receiver_when_empty() {
    let csv = "Date(UTC),Time(UTC),Receiver,Transmitter,TransmitterName,TransmitterSerial,SensorValue,SensorUnit,StationName,Latitude,Longitude\n\
2015-01-01,10:32:42,as-92,29JEQ,,,,,,,\n";
    let detections = parse_detections(&csv_bytes(csv), None).expect("should parse");
    assert_eq!(detections[0].station_name, "as-92");
}

#[test]
fn parses_inbo_happy_path() {
    let csv = "Date/Time,Code Space,ID,Sensor 1,Units 1,Sensor 2,Units 2,Transmitter Name,Transmitter S/N,Receiver Name,Receiver S/N,Station Name,Station Latitude,Station Longitude\n\
21/04/2010 10:42,IENQ,492,,,,,,,VR92S,,as-43,,\n";
    let detections = parse_detections(&csv_bytes(csv), None).expect("should parse");
    assert_eq!(detections[0].transmitter_id, "IENQ-492");
    assert_eq!(detections[0].station_name, "as-43");
}

#[test]
fn inbo_accepts_iso_fallback_datetime() {
    let csv = "Date/Time,Code Space,ID,Sensor 1,Units 1,Sensor 2,Units 2,Transmitter Name,Transmitter S/N,Receiver Name,Receiver S/N,Station Name,Station Latitude,Station Longitude\n\
2010-04-21 10:42:21,IENQ,492,,,,,,,VR92S,,as-43,,\n";
    let detections = parse_detections(&csv_bytes(csv), None).expect("should parse");
    assert_eq!(detections[0].station_name, "as-43");
}

#[test]
fn fails_inbo_on_bad_station_name() {
    let csv = "Date/Time,Code Space,ID,Sensor 1,Units 1,Sensor 2,Units 2,Transmitter Name,Transmitter S/N,Receiver Name,Receiver S/N,Station Name,Station Latitude,Station Longitude\n\
21/04/2010 10:42,IENQ,492,,,,,,,VR92S,,as-43-4,,\n";
    let err = parse_detections(&csv_bytes(csv), None).unwrap_err();
    assert!(matches!(err, ParserError::BadStationName { .. }));
}

#[test]
fn parses_vue_export_happy_path() {
    let csv = "date_time_utc,receiver_id,transmitter_id,old_station_name,station_name,latitude,longitude\n\
2010-04-20 10:42:21,VR92S,29JEQ,,as-43,,\n";
    let detections = parse_detections(&csv_bytes(csv), None).expect("should parse");
    assert_eq!(detections[0].station_name, "as-43");
}

#[test]
fn fails_vue_export_on_bad_station_name() {
    let csv = "date_time_utc,receiver_id,transmitter_id,old_station_name,station_name,latitude,longitude\n\
2010-04-20 10:42:21,VR92S,29JEQ,,17 Iso 8s 18,,\n";
    let err = parse_detections(&csv_bytes(csv), None).unwrap_err();
    assert!(matches!(err, ParserError::BadStationName { .. }));
}

#[test]
fn tab_delimited_export_is_recognised() {
    let csv = "date_time_utc\treceiver_id\ttransmitter_id\told_station_name\tstation_name\tlatitude\tlongitude\n\
2010-04-20 10:42:21\tVR92S\t29JEQ\t\tas-43\t\t\n";
    let detections = parse_detections(&csv_bytes(csv), None).expect("should parse");
    assert_eq!(detections[0].station_name, "as-43");
}

#[test]
fn unrecognised_columns_fail_with_attempts() {
    let csv = "foo,bar\n1,2\n";
    let err = parse_detections(&csv_bytes(csv), None).unwrap_err();
    match err {
        ParserError::UnknownFormat { attempts } => assert_eq!(attempts.len(), 4),
        other => panic!("expected UnknownFormat, got {other:?}"),
    }
}

#[test]
fn empty_file_fails() {
    let csv = "date_time_utc,receiver_id,transmitter_id,old_station_name,station_name,latitude,longitude\n";
    let err = parse_detections(&csv_bytes(csv), None).unwrap_err();
    assert!(matches!(err, ParserError::EmptyData { .. }));
}

#[test]
fn strips_utf8_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(
        "date_time_utc,receiver_id,transmitter_id,old_station_name,station_name,latitude,longitude\n\
2010-04-20 10:42:21,VR92S,29JEQ,,as-43,,\n"
            .as_bytes(),
    );
    let detections = parse_detections(&bytes, None).expect("should parse despite BOM");
    assert_eq!(detections.len(), 1);
}

