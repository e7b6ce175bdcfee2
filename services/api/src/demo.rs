use crate::infra::{
    InMemoryApplicationStore, InMemoryContactRelay, InMemoryDocumentStore, InMemoryMailingList,
    InMemoryNotifier, OfflineDocumentStore, OUTREACH_CALL_TIMEOUT,
};
use chrono::NaiveDate;
use clap::Args;
use dmf_engage::error::AppError;
use dmf_engage::workflows::outreach::{ContactMessage, OutreachService};
use dmf_engage::workflows::scholarship::{
    ApplicationDraft, ApplicationStore, ApplicationWizard, DocumentKind, DocumentStore,
    EducationLevel, Gender, IncomeBracket, ScholarshipType, SubmissionConfig, SubmissionPipeline,
    SubmissionReceipt, MAX_DOCUMENT_BYTES,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Amount to request for the sample application, in naira.
    #[arg(long, default_value_t = 120_000)]
    pub(crate) amount: u32,
    /// Simulate an unreachable document store to show upload tolerance.
    #[arg(long)]
    pub(crate) offline_documents: bool,
    /// Skip the newsletter and contact portion of the demo.
    #[arg(long)]
    pub(crate) skip_outreach: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        amount,
        offline_documents,
        skip_outreach,
    } = args;

    println!("Scholarship intake demo");

    let mut wizard = ApplicationWizard::new();
    match wizard.advance() {
        Ok(_) => println!("- An empty form slipped past the first gate"),
        Err(err) => {
            println!(
                "- The {} gate holds an empty form: {}",
                wizard.step().label(),
                err
            );
            if let Some(errors) = wizard.current_errors() {
                match serde_json::to_string_pretty(&errors) {
                    Ok(json) => println!("  Field errors:\n{}", json),
                    Err(err) => println!("  Field errors unavailable: {}", err),
                }
            }
        }
    }

    fill_sample_draft(wizard.draft_mut(), amount);
    for _ in 0..3 {
        if let Err(err) = wizard.advance() {
            println!("  A completed step failed its gate: {}", err);
            return Ok(());
        }
    }
    println!(
        "- Profile accepted step by step; now at the {} step",
        wizard.step().label()
    );

    let oversized = vec![0u8; MAX_DOCUMENT_BYTES + 1];
    match wizard.attach(
        DocumentKind::IndigeneLetter,
        "indigene-letter.pdf",
        "application/pdf",
        oversized,
    ) {
        Ok(()) => println!("- An oversized file slipped past the size check"),
        Err(rejection) => println!("- Oversized upload refused at selection time: {}", rejection),
    }

    for (kind, file_name, bytes) in [
        (
            DocumentKind::IndigeneLetter,
            "indigene-letter.pdf",
            vec![0u8; 48 * 1024],
        ),
        (
            DocumentKind::EducationDocument,
            "admission-letter.png",
            vec![0u8; 56 * 1024],
        ),
    ] {
        let content_type = mime_guess::from_path(file_name).first_or_octet_stream();
        match wizard.attach(kind, file_name, content_type.essence_str(), bytes) {
            Ok(()) => println!("- Attached {} ({})", file_name, content_type),
            Err(rejection) => {
                println!("  Attachment refused: {}", rejection);
                return Ok(());
            }
        }
    }

    let records = Arc::new(InMemoryApplicationStore::default());
    let notifier = Arc::new(InMemoryNotifier::default());

    let receipt = if offline_documents {
        println!("- Document store offline for this run; the submission should still land");
        submit_application(
            &mut wizard,
            Arc::new(OfflineDocumentStore),
            records.clone(),
            notifier.clone(),
        )
        .await
    } else {
        let documents = Arc::new(InMemoryDocumentStore::default());
        let receipt = submit_application(
            &mut wizard,
            documents.clone(),
            records.clone(),
            notifier.clone(),
        )
        .await;
        for object in documents.stored() {
            println!(
                "  Stored {} ({}, {} bytes)",
                object.object_name, object.content_type, object.size_bytes
            );
        }
        receipt
    };

    let receipt = match receipt {
        Some(receipt) => receipt,
        None => return Ok(()),
    };

    let stored = match records.fetch_by_reference(&receipt.reference).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            println!("  Record lookup returned nothing");
            return Ok(());
        }
        Err(err) => {
            println!("  Record store unavailable: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Record {} on file with {} stored document path(s)",
        stored.id.0,
        stored.fields.documents_on_file()
    );
    match serde_json::to_string_pretty(&stored.status_view()) {
        Ok(json) => println!("  Public status payload:\n{}", json),
        Err(err) => println!("  Public status payload unavailable: {}", err),
    }

    let sent = notifier.requests();
    if sent.is_empty() {
        println!("  Notifications: none dispatched");
    } else {
        println!("  Notifications:");
        for request in sent {
            println!(
                "    - template={} -> {}",
                request.template.label(),
                request.recipient
            );
        }
    }

    if skip_outreach {
        return Ok(());
    }

    println!("\nOutreach demo");
    let directory = Arc::new(InMemoryMailingList::default());
    let relay = Arc::new(InMemoryContactRelay::default());
    let outreach = OutreachService::new(directory.clone(), relay.clone(), OUTREACH_CALL_TIMEOUT);

    for attempt in 1..=2 {
        match outreach
            .subscribe("amina.bello@example.org", Some("Amina".to_string()))
            .await
        {
            Ok(outcome) => println!("- Signup attempt {}: {}", attempt, outcome.label()),
            Err(err) => println!("  Signup attempt {} failed: {}", attempt, err),
        }
    }
    println!(
        "  Addresses on the mailing list: {}",
        directory.subscriber_count()
    );

    let message = ContactMessage {
        name: "Amina Bello".to_string(),
        email: "amina.bello@example.org".to_string(),
        subject: Some("Volunteering".to_string()),
        message: "I would like to help coordinate the next outreach day in Jos.".to_string(),
    };
    match outreach.relay_contact(message).await {
        Ok(()) => println!(
            "- Contact message relayed ({} on record for staff follow-up)",
            relay.messages().len()
        ),
        Err(err) => println!("  Contact relay failed: {}", err),
    }

    Ok(())
}

async fn submit_application<D>(
    wizard: &mut ApplicationWizard,
    documents: Arc<D>,
    records: Arc<InMemoryApplicationStore>,
    notifier: Arc<InMemoryNotifier>,
) -> Option<SubmissionReceipt>
where
    D: DocumentStore + 'static,
{
    let config = SubmissionConfig {
        await_notifications: true,
        ..SubmissionConfig::default()
    };
    let pipeline = SubmissionPipeline::new(documents, records, notifier, config);

    match wizard.submit(&pipeline).await {
        Ok(receipt) => {
            println!("- Application received -> reference {}", receipt.reference);
            Some(receipt)
        }
        Err(err) => {
            println!("  Submission failed: {}", err);
            None
        }
    }
}

fn fill_sample_draft(draft: &mut ApplicationDraft, amount: u32) {
    draft.first_name = Some("Amina".to_string());
    draft.last_name = Some("Bello".to_string());
    draft.email = Some("amina.bello@example.org".to_string());
    draft.phone = Some("0803 123 4567".to_string());
    draft.date_of_birth = NaiveDate::from_ymd_opt(2004, 3, 14);
    draft.gender = Some(Gender::Female);
    draft.address = Some("12 Makurdi Road".to_string());
    draft.city = Some("Jos".to_string());
    draft.education_level = Some(EducationLevel::Undergraduate);
    draft.institution = Some("University of Jos".to_string());
    draft.course_of_study = Some("Biochemistry".to_string());
    draft.year_of_study = Some("200 Level".to_string());
    draft.scholarship_type = Some(ScholarshipType::Tuition);
    draft.amount_requested = Some(amount);
    draft.justification = Some(
        "My father passed away last year and my mother's market stall cannot cover this \
         session's tuition alongside my siblings' school fees."
            .to_string(),
    );
    draft.guardian_name = Some("Mrs. Ngozi Bello".to_string());
    draft.income_bracket = Some(IncomeBracket::Below50k);
}
