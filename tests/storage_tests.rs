use lms_portal::storage::{MockStorageService, S3StorageClient, StorageService, sanitize_key, upload_key};
use uuid::Uuid;

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let mock = MockStorageService::new();
        let key = "uploads/thumbnail.png";
        let url = mock.get_presigned_upload_url(key, "image/png").await.unwrap();

        assert!(url.contains("signature=fake"));
        assert!(url.contains(key));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockStorageService::new_failing();
        let result = mock.get_presigned_upload_url("avatar.png", "image/png").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_sanitization() {
        let mock = MockStorageService::new();
        let url = mock
            .get_presigned_upload_url("../../etc/passwd", "image/png")
            .await
            .unwrap();

        assert!(!url.contains(".."));
        assert!(url.contains("etc/passwd"));
    }
}

#[cfg(test)]
mod key_tests {
    use super::*;

    #[test]
    fn test_sanitize_key_drops_traversal_segments() {
        assert_eq!(sanitize_key("uploads/./a//b.png"), "uploads/a/b.png");
        assert_eq!(sanitize_key("../../secret"), "secret");
        assert_eq!(sanitize_key("/leading/slash.jpg"), "leading/slash.jpg");
        assert_eq!(sanitize_key("plain.png"), "plain.png");
    }

    #[test]
    fn test_upload_key_is_scoped_to_owner() {
        let owner = Uuid::new_v4();

        let key = upload_key(owner, "Holiday Photo.JPG");
        assert!(key.starts_with(&format!("uploads/{}/", owner)));
        assert!(key.ends_with(".jpg"));

        // Only the extension of the client's filename survives.
        let odd = upload_key(owner, "../../evil.p/ng");
        assert!(odd.ends_with(".bin"));
        assert!(!odd.contains(".."));

        assert_ne!(upload_key(owner, "a.png"), upload_key(owner, "a.png"));
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    async fn local_client() -> S3StorageClient {
        S3StorageClient::new("http://localhost:9000", "us-east-1", "testkey", "testsecret", "testbucket").await
    }

    #[tokio::test]
    async fn test_s3_presigned_url_format() {
        let client = local_client().await;

        let key = format!("uploads/{}/cover-{}.png", Uuid::new_v4(), Uuid::new_v4());
        let url = client
            .get_presigned_upload_url(&key, "image/png")
            .await
            .expect("presigning is local and should not need a server");

        // Path-style addressing: endpoint, then bucket, then key.
        assert!(url.starts_with("http://localhost:9000/testbucket/uploads/"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=600"));
    }

    #[tokio::test]
    async fn test_s3_presigned_url_sanitizes_key() {
        let client = local_client().await;

        let url = client
            .get_presigned_upload_url("../escape/avatar.png", "image/png")
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/testbucket/escape/avatar.png"));
    }
}
