use lms_portal::{
    error::{ApiError, ValidationError},
    models::{
        AssignGradeRequest, ContentBody, ContentKind, CreateCourseRequest, CreateReviewRequest,
        LetterGrade, PresignedUrlRequest, QuizPayload, QuizQuestion, RegisterUserRequest, Role,
        TextPayload, UpdateCourseRequest, UpdateProfileRequest, UpdateReviewRequest, VideoPayload,
    },
};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

fn register(is_student: bool, is_instructor: bool) -> RegisterUserRequest {
    RegisterUserRequest {
        username: "margaret".to_string(),
        email: "margaret@example.com".to_string(),
        password: "apollo-11".to_string(),
        is_student,
        is_instructor,
    }
}

// --- Grades ---

#[test]
fn test_every_letter_grade_parses() {
    for (raw, expected) in [
        ("A+", LetterGrade::APlus),
        ("A", LetterGrade::A),
        ("B+", LetterGrade::BPlus),
        ("B", LetterGrade::B),
        ("C", LetterGrade::C),
        ("F", LetterGrade::F),
    ] {
        let request = AssignGradeRequest { grade: raw.to_string() };
        assert_eq!(request.validate(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }
}

#[test]
fn test_unknown_grade_rejected() {
    for raw in ["D", "Z", "a", "", "B-", " A+ \n", "A ", " F"] {
        let request = AssignGradeRequest { grade: raw.to_string() };
        assert!(
            matches!(request.validate(), Err(ValidationError::InvalidGrade(_))),
            "grade '{}' should be rejected",
            raw
        );
    }
}

#[test]
fn test_grade_serializes_with_symbol() {
    assert_eq!(serde_json::to_value(LetterGrade::APlus).unwrap(), json!("A+"));
    let parsed: LetterGrade = serde_json::from_value(json!("B+")).unwrap();
    assert_eq!(parsed, LetterGrade::BPlus);
}

// --- Reviews ---

#[test]
fn test_rating_bounds() {
    let review = |rating| CreateReviewRequest {
        course_id: Uuid::new_v4(),
        rating,
        comment: "Worth it".to_string(),
    };

    assert!(review(1).validate().is_ok());
    assert!(review(5).validate().is_ok());
    assert_eq!(review(0).validate(), Err(ValidationError::RatingOutOfRange(0)));
    assert_eq!(review(6).validate(), Err(ValidationError::RatingOutOfRange(6)));
}

#[test]
fn test_review_comment_limits() {
    let long = CreateReviewRequest {
        course_id: Uuid::new_v4(),
        rating: 3,
        comment: "x".repeat(251),
    };
    assert_eq!(
        long.validate(),
        Err(ValidationError::TooLong { field: "comment", max: 250 })
    );

    let partial = UpdateReviewRequest {
        rating: Some(9),
        comment: None,
    };
    assert_eq!(partial.validate(), Err(ValidationError::RatingOutOfRange(9)));
    assert!(UpdateReviewRequest::default().validate().is_ok());
}

// --- Registration ---

#[test]
fn test_register_resolves_exactly_one_role() {
    assert_eq!(register(true, false).validate(), Ok(Role::Student));
    assert_eq!(register(false, true).validate(), Ok(Role::Instructor));
    assert_eq!(register(true, true).validate(), Err(ValidationError::ConflictingRoles));
    assert_eq!(register(false, false).validate(), Err(ValidationError::MissingRole));
}

#[test]
fn test_register_requires_credentials() {
    let request = RegisterUserRequest {
        password: "   ".to_string(),
        ..register(true, false)
    };
    assert_eq!(request.validate(), Err(ValidationError::MissingField("password")));
}

// --- Courses ---

#[test]
fn test_negative_price_rejected() {
    let request = CreateCourseRequest {
        title: "Databases".to_string(),
        description: "Relational algebra".to_string(),
        price: Some(Decimal::new(-1, 2)),
        category_id: Uuid::new_v4(),
        thumbnail_key: None,
    };
    assert_eq!(request.validate(), Err(ValidationError::Negative("price")));

    let free = CreateCourseRequest {
        price: Some(Decimal::ZERO),
        ..request
    };
    assert!(free.validate().is_ok());
}

#[test]
fn test_price_must_fit_numeric_8_2() {
    let with_price = |price: Decimal| CreateCourseRequest {
        title: "Compilers".to_string(),
        description: "Parsing to codegen".to_string(),
        price: Some(price),
        category_id: Uuid::new_v4(),
        thumbnail_key: None,
    };

    assert!(with_price(Decimal::new(99_999_999, 2)).validate().is_ok());
    // Trailing zeros are not extra precision.
    assert!(with_price(Decimal::new(19_900, 3)).validate().is_ok());

    assert_eq!(
        with_price(Decimal::new(1_000_000, 0)).validate(),
        Err(ValidationError::OutOfRange("price"))
    );
    assert_eq!(
        with_price(Decimal::new(10_005, 3)).validate(),
        Err(ValidationError::OutOfRange("price"))
    );

    let update = UpdateCourseRequest {
        price: Some(Decimal::new(123_456_789, 0)),
        ..UpdateCourseRequest::default()
    };
    assert_eq!(update.validate(), Err(ValidationError::OutOfRange("price")));
    assert_eq!(ValidationError::OutOfRange("price").code(), "out_of_range");
}

// --- Profiles ---

#[test]
fn test_profile_update_limits_bio() {
    let clear = UpdateProfileRequest {
        bio: Some(String::new()),
        profile_image_key: None,
    };
    assert!(clear.validate().is_ok());

    let long = UpdateProfileRequest {
        bio: Some("x".repeat(51)),
        profile_image_key: None,
    };
    assert_eq!(long.validate(), Err(ValidationError::TooLong { field: "bio", max: 50 }));

    let blank_key = UpdateProfileRequest {
        bio: None,
        profile_image_key: Some("  ".to_string()),
    };
    assert_eq!(blank_key.validate(), Err(ValidationError::MissingField("profile_image_key")));
}

// --- Content bodies ---

#[test]
fn test_content_body_wire_shape() {
    let body = ContentBody::Video(VideoPayload {
        title: Some("Intro".to_string()),
        url: "https://cdn.example.com/intro.mp4".to_string(),
        duration_seconds: Some(90),
    });
    let value = serde_json::to_value(&body).unwrap();

    assert_eq!(value["type"], "video");
    assert_eq!(value["data"]["url"], "https://cdn.example.com/intro.mp4");
    assert_eq!(body.kind(), ContentKind::Video);
    assert_eq!(body.title(), Some("Intro"));
}

#[test]
fn test_content_body_rebuilds_from_stored_parts() {
    let body = ContentBody::Text(TextPayload {
        title: None,
        body: "Pointers are addresses.".to_string(),
    });

    let rebuilt = ContentBody::from_parts(body.kind(), body.data()).unwrap();
    assert_eq!(rebuilt, body);

    let mismatched = ContentBody::from_parts(ContentKind::Quiz, json!({ "body": "not a quiz" }));
    assert!(matches!(mismatched, Err(ValidationError::InvalidContent(_))));
}

#[test]
fn test_quiz_requires_prompts_and_answers() {
    let quiz = |prompt: &str, answer: &str| {
        ContentBody::Quiz(QuizPayload {
            title: None,
            questions: vec![QuizQuestion {
                prompt: prompt.to_string(),
                choices: vec![],
                answer: answer.to_string(),
            }],
        })
    };

    assert!(quiz("2 + 2?", "4").validate().is_ok());
    assert!(matches!(
        quiz("", "4").validate(),
        Err(ValidationError::InvalidContent(_))
    ));
    assert!(matches!(
        quiz("2 + 2?", " ").validate(),
        Err(ValidationError::InvalidContent(_))
    ));
}

#[test]
fn test_video_needs_url_and_non_negative_duration() {
    let video = |url: &str, duration| {
        ContentBody::Video(VideoPayload {
            title: None,
            url: url.to_string(),
            duration_seconds: duration,
        })
    };

    assert_eq!(video("", None).validate(), Err(ValidationError::MissingField("url")));
    assert_eq!(
        video("https://v.example.com/1", Some(-5)).validate(),
        Err(ValidationError::Negative("duration_seconds"))
    );
}

#[test]
fn test_redacted_quiz_hides_answers() {
    let body = ContentBody::Quiz(QuizPayload {
        title: Some("Check".to_string()),
        questions: vec![QuizQuestion {
            prompt: "Capital of France?".to_string(),
            choices: vec!["Paris".into(), "Lyon".into()],
            answer: "Paris".to_string(),
        }],
    });

    let redacted = body.redacted();
    let quiz = redacted.as_quiz().unwrap();
    assert!(quiz.questions[0].answer.is_empty());
    assert_eq!(quiz.questions[0].choices.len(), 2);

    let value = serde_json::to_value(&redacted).unwrap();
    assert!(value["data"]["questions"][0].get("answer").is_none());
}

#[test]
fn test_redacting_non_quiz_is_noop() {
    let body = ContentBody::Text(TextPayload {
        title: None,
        body: "Plain".to_string(),
    });
    assert_eq!(body.redacted(), body);
}

// --- Uploads ---

#[test]
fn test_presign_accepts_images_only() {
    let request = |file_type: &str| PresignedUrlRequest {
        filename: "cover.png".to_string(),
        file_type: file_type.to_string(),
    };

    assert!(request("image/png").validate().is_ok());
    assert!(request("image/webp").validate().is_ok());
    assert_eq!(
        request("application/pdf").validate(),
        Err(ValidationError::UnsupportedUpload("application/pdf".to_string()))
    );
}

// --- Error mapping ---

#[test]
fn test_validation_errors_are_bad_requests() {
    let err: ApiError = ValidationError::InvalidGrade("Z".to_string()).into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "invalid_grade");
}
