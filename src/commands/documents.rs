use crate::db::{Budget, Contract, SiteSettings};
use crate::error::{VenueError, VenueResult};
use crate::state::AppState;
use axum::extract::{Json, State};
use printpdf::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufWriter;

use super::utils::format_currency;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub id: i32,
    pub save_path: String,
}

async fn fetch_settings(pool: &crate::db::DbPool) -> VenueResult<SiteSettings> {
    Ok(
        sqlx::query_as::<_, SiteSettings>("SELECT * FROM settings LIMIT 1")
            .fetch_optional(pool)
            .await?
            .unwrap_or_default(),
    )
}

pub async fn generate_budget_pdf(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> VenueResult<Json<Value>> {
    let settings = fetch_settings(&state.pool).await?;

    let budget = sqlx::query_as::<_, Budget>("SELECT * FROM budgets WHERE id = $1")
        .bind(request.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| VenueError::Validation("Orçamento não encontrado.".to_string()))?;

    let save_path = request.save_path;

    tokio::task::spawn_blocking(move || {
        let (doc, page1, layer1) =
            PdfDocument::new("Proposta de Orcamento", Mm(210.0), Mm(297.0), "Layer 1");

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| VenueError::Internal(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| VenueError::Internal(e.to_string()))?;

        let current_layer = doc.get_page(page1).get_layer(layer1);
        let mut current_y: f32 = 270.0;
        let margin_x: f32 = 15.0;
        let content_w: f32 = 180.0;

        let draw_text =
            |layer: &PdfLayerReference, f: &IndirectFontRef, x: f32, y: f32, size: f32, txt: &str| {
                layer.begin_text_section();
                layer.set_font(f, size);
                layer.set_text_cursor(Mm(x), Mm(y));
                layer.write_text(txt, f);
                layer.end_text_section();
            };

        let draw_line = |layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32| {
            let line = Line::from_iter(vec![
                (Point::new(Mm(x1), Mm(y1)), false),
                (Point::new(Mm(x2), Mm(y2)), false),
            ]);
            layer.add_line(line);
        };

        draw_text(
            &current_layer,
            &font_bold,
            margin_x,
            current_y,
            20.0,
            "Proposta de Orcamento",
        );
        current_y -= 8.0;
        draw_text(
            &current_layer,
            &font,
            margin_x,
            current_y,
            10.0,
            &settings.venue_name,
        );
        if let Some(phone) = settings.contact_phone.as_deref() {
            draw_text(
                &current_layer,
                &font,
                margin_x + 90.0,
                current_y,
                10.0,
                &format!("Contato: {}", phone),
            );
        }
        current_y -= 6.0;
        draw_line(
            &current_layer,
            margin_x,
            current_y,
            margin_x + content_w,
            current_y,
        );
        current_y -= 12.0;

        let event_date = budget
            .event_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "A definir".to_string());

        let items = vec![
            ("Cliente", budget.client_name.clone()),
            ("Pacote", budget.package.clone()),
            ("Data do evento", event_date),
            ("Valor", format_currency(budget.amount)),
        ];

        for (label, value) in items {
            draw_text(
                &current_layer,
                &font_bold,
                margin_x + 5.0,
                current_y,
                11.0,
                &format!("{}:", label),
            );
            draw_text(&current_layer, &font, margin_x + 55.0, current_y, 11.0, &value);
            current_y -= 9.0;
        }
        current_y -= 6.0;

        if let Some(notes) = budget.notes.as_deref() {
            draw_text(
                &current_layer,
                &font_bold,
                margin_x,
                current_y,
                11.0,
                "Observacoes:",
            );
            current_y -= 7.0;
            for chunk in wrap_text(notes, 90) {
                draw_text(&current_layer, &font, margin_x + 5.0, current_y, 10.0, &chunk);
                current_y -= 6.0;
            }
            current_y -= 6.0;
        }

        draw_text(
            &current_layer,
            &font,
            margin_x,
            current_y,
            10.0,
            "Proposta valida por 15 dias a partir da data de emissao.",
        );

        draw_text(
            &current_layer,
            &font,
            margin_x,
            10.0,
            8.0,
            &format!(
                "Emitido em {} | {}",
                chrono::Local::now().format("%d/%m/%Y %H:%M"),
                settings.venue_name
            ),
        );

        let file = File::create(save_path)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| VenueError::Internal(e.to_string()))?;
        Ok::<(), VenueError>(())
    })
    .await
    .map_err(|e| VenueError::Internal(e.to_string()))??;

    Ok(Json(json!({ "success": true })))
}

pub async fn generate_contract_pdf(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> VenueResult<Json<Value>> {
    let settings = fetch_settings(&state.pool).await?;

    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
        .bind(request.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| VenueError::Validation("Contrato não encontrado.".to_string()))?;

    let save_path = request.save_path;

    tokio::task::spawn_blocking(move || {
        let (doc, page1, layer1) = PdfDocument::new(
            "Contrato de Prestacao de Servicos",
            Mm(210.0),
            Mm(297.0),
            "Layer 1",
        );

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| VenueError::Internal(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| VenueError::Internal(e.to_string()))?;

        let mut current_layer = doc.get_page(page1).get_layer(layer1);
        let mut current_y: f32 = 270.0;
        let margin_x: f32 = 15.0;
        let content_w: f32 = 180.0;

        let draw_text =
            |layer: &PdfLayerReference, f: &IndirectFontRef, x: f32, y: f32, size: f32, txt: &str| {
                layer.begin_text_section();
                layer.set_font(f, size);
                layer.set_text_cursor(Mm(x), Mm(y));
                layer.write_text(txt, f);
                layer.end_text_section();
            };

        let draw_line = |layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32| {
            let line = Line::from_iter(vec![
                (Point::new(Mm(x1), Mm(y1)), false),
                (Point::new(Mm(x2), Mm(y2)), false),
            ]);
            layer.add_line(line);
        };

        draw_text(
            &current_layer,
            &font_bold,
            margin_x,
            current_y,
            16.0,
            "Contrato de Prestacao de Servicos",
        );
        current_y -= 7.0;
        draw_text(
            &current_layer,
            &font,
            margin_x,
            current_y,
            10.0,
            &format!("Protocolo: {}", contract.protocol),
        );
        current_y -= 5.0;
        draw_line(
            &current_layer,
            margin_x,
            current_y,
            margin_x + content_w,
            current_y,
        );
        current_y -= 10.0;

        let event_date = contract
            .event_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "a definir".to_string());

        let preamble = format!(
            "Contratada: {}. Contratante: {}. Objeto: cessao do espaco e prestacao de servicos para evento na data {}, pelo valor total de {}.",
            settings.venue_name,
            contract.client_name,
            event_date,
            format_currency(contract.amount)
        );

        for chunk in wrap_text(&preamble, 95) {
            draw_text(&current_layer, &font, margin_x, current_y, 10.0, &chunk);
            current_y -= 6.0;
        }
        current_y -= 6.0;

        let clauses = [
            "1. A reserva da data somente se confirma com a assinatura deste instrumento e o pagamento do sinal acordado.",
            "2. O valor restante devera ser quitado ate a data do evento.",
            "3. Em caso de cancelamento pelo contratante, o sinal pago nao sera restituido.",
            "4. O contratante responde por danos causados ao espaco e aos equipamentos durante o evento.",
            "5. A contratada se obriga a entregar o espaco limpo e montado conforme o pacote contratado.",
            "6. Casos omissos serao resolvidos de comum acordo entre as partes.",
        ];

        for clause in clauses {
            for chunk in wrap_text(clause, 95) {
                if current_y < 20.0 {
                    let (p2, l2) = doc.add_page(Mm(210.0), Mm(297.0), "Clausulas");
                    current_layer = doc.get_page(p2).get_layer(l2);
                    current_y = 270.0;
                }
                draw_text(&current_layer, &font, margin_x, current_y, 10.0, &chunk);
                current_y -= 6.0;
            }
            current_y -= 3.0;
        }

        if let Some(notes) = contract.notes.as_deref() {
            current_y -= 4.0;
            for chunk in wrap_text(notes, 95) {
                if current_y < 20.0 {
                    let (p2, l2) = doc.add_page(Mm(210.0), Mm(297.0), "Observacoes");
                    current_layer = doc.get_page(p2).get_layer(l2);
                    current_y = 270.0;
                }
                draw_text(&current_layer, &font, margin_x, current_y, 10.0, &chunk);
                current_y -= 6.0;
            }
        }

        if current_y < 50.0 {
            let (p2, l2) = doc.add_page(Mm(210.0), Mm(297.0), "Assinaturas");
            current_layer = doc.get_page(p2).get_layer(l2);
            current_y = 270.0;
        }
        current_y -= 20.0;
        draw_line(&current_layer, margin_x, current_y, margin_x + 80.0, current_y);
        draw_line(
            &current_layer,
            margin_x + 100.0,
            current_y,
            margin_x + content_w,
            current_y,
        );
        current_y -= 5.0;
        draw_text(
            &current_layer,
            &font,
            margin_x,
            current_y,
            9.0,
            &settings.venue_name,
        );
        draw_text(
            &current_layer,
            &font,
            margin_x + 100.0,
            current_y,
            9.0,
            &contract.client_name,
        );

        draw_text(
            &current_layer,
            &font,
            margin_x,
            10.0,
            8.0,
            &format!(
                "Emitido em {} | Protocolo {}",
                chrono::Local::now().format("%d/%m/%Y %H:%M"),
                contract.protocol
            ),
        );

        let file = File::create(save_path)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| VenueError::Internal(e.to_string()))?;
        Ok::<(), VenueError>(())
    })
    .await
    .map_err(|e| VenueError::Internal(e.to_string()))??;

    Ok(Json(json!({ "success": true })))
}

/// Greedy word wrap by character count. Good enough for fixed-width PDF rows.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
