use super::*;

#[test]
fn decodes_both_key_spellings() {
    assert_eq!(
        decode_request(r#"{"Type":"GETFRAMECOUNT"}"#),
        Ok(Command::GetFrameCount)
    );
    assert_eq!(
        decode_request(r#"{"type":"GETDATA","args":{"from":1,"to":3}}"#),
        Ok(Command::GetData { from: 1, to: 3 })
    );
    assert_eq!(
        decode_request(r#"{"Type":"GETDATA","Args":{"from":-4,"to":0}}"#),
        Ok(Command::GetData { from: -4, to: 0 })
    );
}

#[test]
fn argument_problems_are_invalid_args() {
    for text in [
        r#"{"Type":"GETDATA"}"#,
        r#"{"Type":"GETDATA","Args":{"from":1}}"#,
        r#"{"Type":"GETDATA","Args":{"from":"1","to":2}}"#,
        r#"{"Type":"GETDATA","Args":{"from":0.5,"to":2}}"#,
        r#"{"Type":"GETDATA","Args":{"from":null,"to":2}}"#,
        r#"{"Type":"GETDATA","Args":[0,1]}"#,
        r#"{"type":"GETDATA","args":"0-1"}"#,
    ] {
        let err = decode_request(text).unwrap_err();
        assert!(
            matches!(err, RequestError::InvalidArgs { ref command, .. } if command == GET_DATA),
            "{text}: {err:?}"
        );
    }
}

#[test]
fn non_object_args_keep_the_request_type() {
    let err = decode_request(r#"{"Type":"GETDATA","Args":[0,1]}"#).unwrap_err();
    assert_eq!(err.response_type(), GET_DATA);
    assert_eq!(Response::error(&err).kind, GET_DATA);

    assert_eq!(
        decode_request(r#"{"Type":"GETFRAMECOUNT","Args":[]}"#),
        Ok(Command::GetFrameCount)
    );
    assert_eq!(
        decode_request(r#"{"type":"GETFRAMECOUNT","args":5}"#),
        Ok(Command::GetFrameCount)
    );
    assert_eq!(
        decode_request(r#"{"Type":"GETDATA","Args":null}"#),
        Err(RequestError::InvalidArgs {
            command: GET_DATA.to_owned(),
            reason: "missing 'from'".to_owned(),
        })
    );
}

#[test]
fn unknown_and_malformed_requests() {
    let err = decode_request(r#"{"Type":"PLAY"}"#).unwrap_err();
    assert_eq!(err, RequestError::UnknownCommand("PLAY".to_owned()));
    assert_eq!(err.response_type(), "PLAY");

    assert!(matches!(
        decode_request("not json"),
        Err(RequestError::Malformed(_))
    ));
    assert!(matches!(
        decode_request(r#"{"Args":{}}"#),
        Err(RequestError::Malformed(_))
    ));
}

#[test]
fn responses_use_the_capitalized_wire_shape() {
    let json = Response::frame_count(3).to_json().unwrap();
    assert_eq!(
        json,
        r#"{"ErrorCode":200,"Type":"GETFRAMECOUNT","Data":{"FrameCount":3}}"#
    );

    let err = RequestError::OutOfRange {
        from: 0,
        to: 0,
        frame_count: 3,
    };
    let value: Value = serde_json::from_str(&Response::error(&err).to_json().unwrap()).unwrap();
    assert_eq!(value["ErrorCode"], 500);
    assert_eq!(value["Type"], "GETDATA");
    assert_eq!(
        value["Data"]["Err"],
        "frame range [0, 0) is out of bounds for 3 frames"
    );
}

#[test]
fn frame_payload_survives_base64() {
    let payload = RenderedFrame::new(vec![0x1f, 0x8b, 0x00, b'<', 0xff]);
    let resp = Response::frame(&payload);
    let back: Response = serde_json::from_str(&resp.to_json().unwrap()).unwrap();
    assert_eq!(back, resp);
    assert_eq!(back.frame_bytes().unwrap(), payload.as_bytes());
}
